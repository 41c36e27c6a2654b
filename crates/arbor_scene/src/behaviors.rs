//! Example behaviors.

use arbor_core::math::{Angle, Rotation};
use glam::Vec3;

use crate::component::{Component, ComponentContext};
use crate::transform::Space;

/// Rotates its owner at a constant angular velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spinner {
    pub axis: Vec3,
    /// Angle turned per second of update time.
    pub speed: Angle,
    pub space: Space,
}

impl Spinner {
    #[must_use]
    pub fn new(axis: Vec3, degrees_per_second: f32) -> Self {
        Self {
            axis,
            speed: Angle::from_degrees(degrees_per_second),
            space: Space::Local,
        }
    }

    #[must_use]
    pub fn in_space(mut self, space: Space) -> Self {
        self.space = space;
        self
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new(Vec3::Y, 90.0)
    }
}

impl Component for Spinner {
    fn on_update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) {
        let step = Rotation::from_axis_angle(self.axis, self.speed * dt);
        let owner = ctx.owner();
        ctx.scene().rotate(owner, step, self.space);
    }
}
