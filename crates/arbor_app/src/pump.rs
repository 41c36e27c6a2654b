//! Frame pump.
//!
//! One [`FramePump::pump`] call is one idle callback of the host loop: it
//! turns elapsed time into at most `max_steps_per_pump` calls to
//! [`Scene::update`] with the fixed timestep, then renders once if anything
//! changed (or always, with `render_when_idle`).

use std::time::Duration;

use arbor_core::errors::Result;
use arbor_scene::{RenderSink, Scene};

use crate::clock::{FrameClock, FrameSteps};
use crate::settings::LoopSettings;

/// What one pump did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpReport {
    pub steps: u32,
    pub rendered: bool,
    pub draws: usize,
    /// Seconds discarded by the delta and step caps.
    pub dropped: f32,
}

#[derive(Debug, Clone)]
pub struct FramePump {
    settings: LoopSettings,
    clock: FrameClock,
}

impl FramePump {
    /// Creates a pump after validating `settings`.
    pub fn new(settings: LoopSettings) -> Result<Self> {
        let clock = FrameClock::new(&settings)?;
        Ok(Self { settings, clock })
    }

    #[must_use]
    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Pumps using wall-clock time since the previous call.
    pub fn pump(&mut self, scene: &mut Scene, sink: &mut dyn RenderSink) -> PumpReport {
        let steps = self.clock.tick();
        self.run(steps, scene, sink)
    }

    /// Pumps as if `elapsed` had passed since the previous call.
    pub fn pump_with_elapsed(
        &mut self,
        elapsed: Duration,
        scene: &mut Scene,
        sink: &mut dyn RenderSink,
    ) -> PumpReport {
        let steps = self.clock.advance(elapsed);
        self.run(steps, scene, sink)
    }

    fn run(&self, frame: FrameSteps, scene: &mut Scene, sink: &mut dyn RenderSink) -> PumpReport {
        for _ in 0..frame.steps {
            scene.update(frame.step_dt);
        }

        let rendered = frame.steps > 0 || self.settings.render_when_idle;
        let draws = if rendered { scene.render(sink) } else { 0 };
        log::trace!(
            "Pump: {} steps, {} draws, {:.3}s dropped",
            frame.steps,
            draws,
            frame.dropped
        );

        PumpReport {
            steps: frame.steps,
            rendered,
            draws,
            dropped: frame.dropped,
        }
    }
}
