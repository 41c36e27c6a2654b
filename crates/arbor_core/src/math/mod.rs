//! Angle and rotation primitives.

pub mod angle;
pub mod rotation;

pub use angle::Angle;
pub use rotation::Rotation;
