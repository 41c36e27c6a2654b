//! Fixed-step frame clock.

use std::time::{Duration, Instant};

use arbor_core::errors::Result;

use crate::settings::LoopSettings;

/// Slack when comparing accumulated time against the step length, so
/// durations rounded to whole nanoseconds still produce their step.
const STEP_EPSILON: f64 = 1e-6;

/// Result of feeding elapsed time to a [`FrameClock`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSteps {
    /// Update steps to run now.
    pub steps: u32,
    /// Delta time to pass to each step, in seconds.
    pub step_dt: f32,
    /// Seconds discarded by the frame-delta cap and the step cap.
    pub dropped: f32,
}

/// Accumulates elapsed time and converts it into fixed update steps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: f64,
    max_frame_delta: f64,
    max_steps: u32,

    accumulator: f64,
    last_tick: Option<Instant>,
    /// Total simulated time
    pub simulated: Duration,
    /// Total number of steps produced
    pub step_count: u64,
    /// Total number of ticks
    pub frame_count: u64,
}

impl FrameClock {
    /// Creates a clock after validating `settings`.
    pub fn new(settings: &LoopSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            step: f64::from(settings.fixed_timestep),
            max_frame_delta: f64::from(settings.max_frame_delta),
            max_steps: settings.max_steps_per_pump,
            accumulator: 0.0,
            last_tick: None,
            simulated: Duration::ZERO,
            step_count: 0,
            frame_count: 0,
        })
    }

    /// Advances by wall-clock time since the previous tick. The first tick
    /// only starts the clock.
    pub fn tick(&mut self) -> FrameSteps {
        let now = Instant::now();
        let elapsed = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.advance(elapsed)
    }

    /// Advances by an explicit duration.
    pub fn advance(&mut self, elapsed: Duration) -> FrameSteps {
        self.frame_count += 1;

        let raw = elapsed.as_secs_f64();
        let capped = raw.min(self.max_frame_delta);
        let mut dropped = raw - capped;
        self.accumulator += capped;

        let mut steps = 0;
        while steps < self.max_steps && self.accumulator + STEP_EPSILON >= self.step {
            self.accumulator = (self.accumulator - self.step).max(0.0);
            steps += 1;
        }
        if self.accumulator + STEP_EPSILON >= self.step {
            // Starvation guard: whole steps beyond the cap are discarded
            let backlog = (self.accumulator / self.step).floor() * self.step;
            dropped += backlog;
            self.accumulator -= backlog;
            log::debug!("Frame clock dropped {backlog:.3}s of backlog");
        }

        self.step_count += u64::from(steps);
        self.simulated += Duration::from_secs_f64(self.step * f64::from(steps));

        FrameSteps {
            steps,
            step_dt: self.step as f32,
            dropped: dropped as f32,
        }
    }

    /// Fraction of a step currently accumulated, in `[0, 1)`.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step) as f32
    }

    /// Clears accumulated time and restarts wall-clock tracking.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_tick = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(step: f32, cap: f32, max_steps: u32) -> FrameClock {
        FrameClock::new(&LoopSettings {
            fixed_timestep: step,
            max_frame_delta: cap,
            max_steps_per_pump: max_steps,
            render_when_idle: false,
        })
        .unwrap()
    }

    #[test]
    fn accumulates_partial_steps() {
        let mut c = clock(0.1, 1.0, 5);
        assert_eq!(c.advance(Duration::from_millis(50)).steps, 0);
        assert!((c.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(c.advance(Duration::from_millis(50)).steps, 1);
        assert_eq!(c.step_count, 1);
    }

    #[test]
    fn frame_delta_is_capped() {
        let mut c = clock(0.1, 0.3, 10);
        let s = c.advance(Duration::from_secs(2));
        assert_eq!(s.steps, 3);
        assert!((s.dropped - 1.7).abs() < 1e-3);
    }

    #[test]
    fn step_count_is_capped_and_backlog_dropped() {
        let mut c = clock(0.1, 1.0, 2);
        let s = c.advance(Duration::from_millis(550));
        assert_eq!(s.steps, 2);
        assert!((s.dropped - 0.3).abs() < 1e-3);
        // Only the fractional remainder survives
        assert!((c.alpha() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn rejects_unusable_step() {
        for step in [0.0, -0.1, f32::NAN] {
            let settings = LoopSettings {
                fixed_timestep: step,
                ..LoopSettings::default()
            };
            assert!(FrameClock::new(&settings).is_err(), "{step}");
        }
    }

    #[test]
    fn first_tick_starts_the_clock() {
        let mut c = clock(0.1, 1.0, 5);
        let s = c.tick();
        assert_eq!(s.steps, 0);
        assert_eq!(s.dropped, 0.0);
    }
}
