//! Chainable node operation wrapper.
//!
//! [`NodeMut`] borrows a [`Scene`] mutably and provides a fluent API for
//! editing one node without threading its handle through every call.
//!
//! All methods silently no-op when the handle is stale, and invalid values
//! (zero scale, cycle-forming parents) are rejected exactly as the
//! corresponding [`Scene`] method rejects them.
//!
//! # Example
//!
//! ```rust,ignore
//! scene.node(handle)
//!     .set_position(Vec3::new(0.0, 3.0, 0.0))
//!     .set_uniform_scale(2.0)
//!     .look_at(Vec3::ZERO)
//!     .set_active(false);
//! ```
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
use arbor_core::math::Rotation;
use glam::Vec3;

use crate::component::Component;
use crate::scene::Scene;
use crate::transform::Space;
use crate::transform_system::LookTarget;
use crate::NodeHandle;

/// Temporary mutable borrow of a scene node for chainable operations.
pub struct NodeMut<'a> {
    scene: &'a mut Scene,
    handle: NodeHandle,
}

impl<'a> NodeMut<'a> {
    #[inline]
    pub fn new(scene: &'a mut Scene, handle: NodeHandle) -> Self {
        Self { scene, handle }
    }

    /// Returns the underlying handle.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.scene.contains(self.handle)
    }

    // -- Transform setters (chainable) --

    #[inline]
    pub fn set_position(self, position: Vec3) -> Self {
        self.scene.set_position(self.handle, position);
        self
    }

    #[inline]
    pub fn set_rotation(self, rotation: impl Into<Rotation>) -> Self {
        self.scene.set_rotation(self.handle, rotation);
        self
    }

    /// Pitch/yaw/roll in degrees.
    #[inline]
    pub fn set_euler_angles(self, degrees: Vec3) -> Self {
        self.scene.set_euler_angles(self.handle, degrees);
        self
    }

    #[inline]
    pub fn set_scale(self, scale: Vec3) -> Self {
        self.scene.set_scale(self.handle, scale);
        self
    }

    #[inline]
    pub fn set_uniform_scale(self, s: f32) -> Self {
        self.set_scale(Vec3::splat(s))
    }

    #[inline]
    pub fn set_world_position(self, position: Vec3) -> Self {
        self.scene.set_world_position(self.handle, position);
        self
    }

    #[inline]
    pub fn translate(self, delta: Vec3, space: Space) -> Self {
        self.scene.translate(self.handle, delta, space);
        self
    }

    #[inline]
    pub fn rotate(self, rotation: impl Into<Rotation>, space: Space) -> Self {
        self.scene.rotate(self.handle, rotation, space);
        self
    }

    /// Points +Z at a world-space point or another node.
    #[inline]
    pub fn look_at(self, target: impl Into<LookTarget>) -> Self {
        self.scene.look_at(self.handle, target);
        self
    }

    // -- Node state --

    #[inline]
    pub fn set_active(self, active: bool) -> Self {
        self.scene.set_active(self.handle, active);
        self
    }

    #[inline]
    pub fn set_name(self, name: &str) -> Self {
        self.scene.set_name(self.handle, name);
        self
    }

    #[inline]
    pub fn set_tag(self, tag: impl Into<String>) -> Self {
        self.scene.set_tag(self.handle, tag);
        self
    }

    #[inline]
    pub fn set_parent(self, parent: Option<NodeHandle>) -> Self {
        self.scene.set_parent(self.handle, parent);
        self
    }

    #[inline]
    pub fn with_component(self, component: impl Component) -> Self {
        self.scene.attach_component(self.handle, component);
        self
    }

    #[inline]
    pub fn add_component<T: Component + Default>(self) -> Self {
        self.scene.add_component::<T>(self.handle);
        self
    }

    // -- Getters --

    #[inline]
    pub fn world_position(&self) -> Option<Vec3> {
        self.scene.world_position(self.handle)
    }

    #[inline]
    pub fn position(&self) -> Option<Vec3> {
        self.scene.position(self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_applies_every_setter() {
        let mut scene = Scene::new();
        let parent = scene.spawn("parent");
        let n = scene.spawn("n");

        let world = scene
            .node(n)
            .set_parent(Some(parent))
            .set_position(Vec3::new(1.0, 2.0, 3.0))
            .set_uniform_scale(2.0)
            .set_tag("Enemy")
            .world_position();

        assert_eq!(world, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(scene.parent(n), Some(parent));
        assert_eq!(scene.scale(n), Some(Vec3::splat(2.0)));
        assert_eq!(scene.get_node(n).map(|n| n.tag()), Some("Enemy"));
    }

    #[test]
    fn stale_handle_is_noop() {
        let mut scene = Scene::new();
        let n = scene.spawn("n");
        scene.destroy_node(n);

        let node = scene.node(n).set_position(Vec3::ONE).set_active(false);
        assert!(!node.exists());
        assert_eq!(node.world_position(), None);
    }
}
