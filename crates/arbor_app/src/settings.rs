//! Loop Settings
//!
//! Configuration of the fixed-step frame loop.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use arbor_app::LoopSettings;
//!
//! // 60 Hz updates, at most 5 catch-up steps per pump
//! let settings = LoopSettings::default();
//!
//! // 30 Hz simulation that still renders when no step was due
//! let settings = LoopSettings {
//!     fixed_timestep: 1.0 / 30.0,
//!     render_when_idle: true,
//!     ..Default::default()
//! };
//!
//! // From a JSON file; missing fields keep their defaults
//! let settings = LoopSettings::load("loop.json")?;
//! ```

use std::path::Path;

use arbor_core::errors::{ArborError, Result};
use serde::{Deserialize, Serialize};

/// Frame loop configuration.
///
/// Every field has a default, so a partial JSON document is valid input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopSettings {
    /// Seconds of simulated time per update step.
    ///
    /// Default: `1/60`.
    pub fixed_timestep: f32,

    /// Cap applied to wall-clock time between two pumps, in seconds.
    ///
    /// Elapsed time above this (a debugger pause, a window drag) is dropped
    /// instead of being simulated. Default: `1.0`.
    pub max_frame_delta: f32,

    /// Maximum update steps run by one pump.
    ///
    /// Backlog beyond this is discarded so a slow frame cannot starve the
    /// render. Default: `5`.
    pub max_steps_per_pump: u32,

    /// Render even when no update step was due.
    ///
    /// Default: `false`.
    pub render_when_idle: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_frame_delta: 1.0,
            max_steps_per_pump: 5,
            render_when_idle: false,
        }
    }
}

impl LoopSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(ArborError::InvalidSettings(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta >= self.fixed_timestep) {
            return Err(ArborError::InvalidSettings(format!(
                "max_frame_delta ({}) must be at least fixed_timestep ({})",
                self.max_frame_delta, self.fixed_timestep
            )));
        }
        if self.max_steps_per_pump == 0 {
            return Err(ArborError::InvalidSettings(
                "max_steps_per_pump must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Parses and validates settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and validates settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loading loop settings from {}", path.display());
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
