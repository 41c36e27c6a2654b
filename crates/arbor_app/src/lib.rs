//! Arbor App
//!
//! The external driver of a [`Scene`](arbor_scene::Scene): a fixed-step
//! [`FrameClock`] and a [`FramePump`] that turns elapsed time into bounded
//! `update` passes followed by a render, configured by [`LoopSettings`].

pub mod clock;
pub mod pump;
pub mod settings;

pub use clock::{FrameClock, FrameSteps};
pub use pump::{FramePump, PumpReport};
pub use settings::LoopSettings;
