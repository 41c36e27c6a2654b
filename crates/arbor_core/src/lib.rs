//! Arbor Core
//!
//! Foundational types shared by every Arbor crate:
//!
//! - [`math`]: [`Angle`] and [`Rotation`]
//! - [`ids`]: process-unique [`InstanceId`] allocation
//! - [`errors`]: [`ArborError`] and the [`Result`] alias

pub mod errors;
pub mod ids;
pub mod math;

pub use errors::{ArborError, Result};
pub use ids::{IdAllocator, InstanceId, ProcessIds, SequentialIds, next_instance_id};
pub use math::{Angle, Rotation};
