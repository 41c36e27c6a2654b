//! Local TRS state and the world matrix cache.

use std::cell::Cell;

use arbor_core::math::Rotation;
use glam::{Affine3A, Mat4, Vec3};

/// Reference frame for [`Scene::translate`](crate::Scene::translate) and
/// [`Scene::rotate`](crate::Scene::rotate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    /// The root coordinate frame.
    World,
    /// The parent's frame. Same as `World` for a node without a parent.
    Parent,
    /// The node's own axes.
    Local,
}

/// Transform owned inline by every [`SceneNode`](crate::SceneNode).
///
/// Position, rotation and scale are relative to the parent. The world
/// matrix is cached behind a dirty flag and only recomputed on read; all
/// writes go through [`Scene`](crate::Scene) so the owning subtree is
/// invalidated together.
///
/// Matrices use column vectors: `local = T * R * S` and
/// `world = parent_world * local`.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Rotation,
    scale: Vec3,

    world_matrix: Cell<Affine3A>,
    world_dirty: Cell<bool>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Rotation::identity(),
            scale: Vec3::ONE,
            world_matrix: Cell::new(Affine3A::IDENTITY),
            // Forces the first read to compute
            world_dirty: Cell::new(true),
        }
    }

    // ========================================================================
    // Local state
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Euler angles of the local rotation, degrees in `[0, 360)`.
    #[inline]
    #[must_use]
    pub fn euler_angles(&self) -> Vec3 {
        self.rotation.euler_angles()
    }

    /// `T * R * S` of the local values.
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            self.scale,
            self.rotation.quaternion(),
            self.position,
        )
    }

    #[must_use]
    pub fn local_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.local_matrix())
    }

    pub(crate) fn write_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub(crate) fn write_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub(crate) fn write_euler_angles(&mut self, degrees: Vec3) {
        self.rotation.set_euler_angles(degrees);
    }

    /// Rejects any scale with an axis equal to zero.
    pub(crate) fn write_scale(&mut self, scale: Vec3) -> bool {
        if !is_valid_scale(scale) {
            return false;
        }
        self.scale = scale;
        true
    }

    // ========================================================================
    // World matrix cache
    // ========================================================================

    /// Whether the cached world matrix is stale.
    #[inline]
    #[must_use]
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty.get()
    }

    #[inline]
    pub(crate) fn mark_world_dirty(&self) {
        self.world_dirty.set(true);
    }

    /// The cached world matrix. Only meaningful while clean.
    #[inline]
    pub(crate) fn cached_world(&self) -> Affine3A {
        self.world_matrix.get()
    }

    #[inline]
    pub(crate) fn store_world(&self, world: Affine3A) {
        self.world_matrix.set(world);
        self.world_dirty.set(false);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// A scale is valid when no axis is exactly zero and all axes are finite.
#[must_use]
pub fn is_valid_scale(scale: Vec3) -> bool {
    scale.is_finite() && scale.x != 0.0 && scale.y != 0.0 && scale.z != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transform_starts_dirty_at_identity() {
        let t = Transform::new();
        assert!(t.is_world_dirty());
        assert_eq!(t.position(), Vec3::ZERO);
        assert_eq!(t.scale(), Vec3::ONE);
        assert_eq!(t.local_matrix(), Affine3A::IDENTITY);
    }

    #[test]
    fn zero_scale_axis_is_rejected() {
        let mut t = Transform::new();
        assert!(t.write_scale(Vec3::new(2.0, 2.0, 2.0)));
        assert!(!t.write_scale(Vec3::new(0.0, 1.0, 1.0)));
        assert!(!t.write_scale(Vec3::new(1.0, 1.0, -0.0)));
        assert_eq!(t.scale(), Vec3::splat(2.0));
    }

    #[test]
    fn negative_scale_is_allowed() {
        let mut t = Transform::new();
        assert!(t.write_scale(Vec3::new(-1.0, 1.0, 1.0)));
    }

    #[test]
    fn local_matrix_applies_scale_then_rotation_then_translation() {
        let mut t = Transform::new();
        t.write_position(Vec3::new(10.0, 0.0, 0.0));
        t.write_euler_angles(Vec3::new(0.0, 90.0, 0.0));
        assert!(t.write_scale(Vec3::splat(2.0)));

        // (0,0,1) -> scale (0,0,2) -> yaw 90 (2,0,0) -> translate (12,0,0)
        let p = t.local_matrix().transform_point3(Vec3::Z);
        assert!(p.abs_diff_eq(Vec3::new(12.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn store_world_clears_dirty() {
        let t = Transform::new();
        let m = Affine3A::from_translation(Vec3::X);
        t.store_world(m);
        assert!(!t.is_world_dirty());
        assert_eq!(t.cached_world(), m);
        t.mark_world_dirty();
        assert!(t.is_world_dirty());
    }
}
