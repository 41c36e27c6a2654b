//! Transform System
//!
//! World matrix resolution and invalidation, kept as free functions over the
//! node arena so they can run from `&Scene` and be tested in isolation.
//!
//! # Cache invariant
//!
//! Every invalidation marks a node's whole subtree dirty, so a clean node
//! always has clean ancestors. Two shortcuts follow from that:
//!
//! - [`invalidate_subtree`] stops descending at a node that is already dirty
//! - [`resolve_world_matrix`] walks up only to the first clean ancestor and
//!   stores every matrix it composes on the way back down
//!
//! The rest of this module is the transform surface of [`Scene`]: local
//! setters, world-space accessors and the space-relative `translate`,
//! `rotate` and `look_at` operations.

use arbor_core::math::Rotation;
use glam::{Affine3A, Mat4, Quat, Vec3};
use slotmap::SlotMap;

use crate::node::SceneNode;
use crate::scene::Scene;
use crate::transform::{Space, is_valid_scale};
use crate::NodeHandle;

/// Squared distance below which a look-at source and target coincide.
const LOOK_AT_EPSILON: f32 = 1e-10;

/// Returns the local-to-world matrix of `handle`, refreshing stale caches on
/// the path from the first clean ancestor down to `handle`.
pub fn resolve_world_matrix(
    nodes: &SlotMap<NodeHandle, SceneNode>,
    handle: NodeHandle,
) -> Option<Affine3A> {
    let node = nodes.get(handle)?;
    if !node.transform.is_world_dirty() {
        return Some(node.transform.cached_world());
    }

    // Dirty chain, leaf first
    let mut chain = vec![handle];
    let mut parent_world = Affine3A::IDENTITY;
    let mut cursor = node.parent;
    while let Some(h) = cursor {
        let Some(ancestor) = nodes.get(h) else {
            break;
        };
        if !ancestor.transform.is_world_dirty() {
            parent_world = ancestor.transform.cached_world();
            break;
        }
        chain.push(h);
        cursor = ancestor.parent;
    }

    let mut world = parent_world;
    for &h in chain.iter().rev() {
        if let Some(n) = nodes.get(h) {
            world *= n.transform.local_matrix();
            n.transform.store_world(world);
        }
    }
    Some(world)
}

/// Marks `root` and every descendant dirty. Returns how many nodes changed
/// state.
pub fn invalidate_subtree(nodes: &SlotMap<NodeHandle, SceneNode>, root: NodeHandle) -> usize {
    let mut stack = vec![root];
    let mut count = 0;
    while let Some(h) = stack.pop() {
        let Some(node) = nodes.get(h) else {
            continue;
        };
        if node.transform.is_world_dirty() {
            continue;
        }
        node.transform.mark_world_dirty();
        count += 1;
        stack.extend_from_slice(&node.children);
    }
    count
}

/// Top-down walk over the trees under `roots`, handing each node its world
/// matrix. Dirty nodes are resolved from the parent's matrix carried on the
/// stack and their caches stored. With `active_only`, inactive nodes and
/// their subtrees are skipped.
pub fn walk_world_matrices(
    nodes: &SlotMap<NodeHandle, SceneNode>,
    roots: &[NodeHandle],
    active_only: bool,
    mut visit: impl FnMut(NodeHandle, &SceneNode, Affine3A),
) {
    let mut stack: Vec<(NodeHandle, Affine3A)> = Vec::with_capacity(64);
    stack.extend(roots.iter().rev().map(|&r| (r, Affine3A::IDENTITY)));

    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get(handle) else {
            continue;
        };
        if active_only && !node.active {
            continue;
        }
        let t = &node.transform;
        let world = if t.is_world_dirty() {
            let world = parent_world * t.local_matrix();
            t.store_world(world);
            world
        } else {
            t.cached_world()
        };
        visit(handle, node, world);
        stack.extend(node.children.iter().rev().map(|&c| (c, world)));
    }
}

/// Target of [`Scene::look_at`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookTarget {
    /// A world-space point.
    Point(Vec3),
    /// Another node's world position.
    Node(NodeHandle),
}

impl From<Vec3> for LookTarget {
    fn from(p: Vec3) -> Self {
        Self::Point(p)
    }
}

impl From<NodeHandle> for LookTarget {
    fn from(h: NodeHandle) -> Self {
        Self::Node(h)
    }
}

impl Scene {
    // ========================================================================
    // Local space
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn transform(&self, handle: NodeHandle) -> Option<&crate::Transform> {
        self.nodes.get(handle).map(|n| &n.transform)
    }

    #[must_use]
    pub fn position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.transform(handle).map(crate::Transform::position)
    }

    #[must_use]
    pub fn rotation(&self, handle: NodeHandle) -> Option<Rotation> {
        self.transform(handle).map(|t| t.rotation().clone())
    }

    #[must_use]
    pub fn scale(&self, handle: NodeHandle) -> Option<Vec3> {
        self.transform(handle).map(crate::Transform::scale)
    }

    #[must_use]
    pub fn euler_angles(&self, handle: NodeHandle) -> Option<Vec3> {
        self.transform(handle).map(crate::Transform::euler_angles)
    }

    pub fn set_position(&mut self, handle: NodeHandle, position: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        node.transform.write_position(position);
        invalidate_subtree(&self.nodes, handle);
        true
    }

    pub fn set_rotation(&mut self, handle: NodeHandle, rotation: impl Into<Rotation>) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        node.transform.write_rotation(rotation.into());
        invalidate_subtree(&self.nodes, handle);
        true
    }

    /// Sets the local rotation from pitch/yaw/roll degrees.
    pub fn set_euler_angles(&mut self, handle: NodeHandle, degrees: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        node.transform.write_euler_angles(degrees);
        invalidate_subtree(&self.nodes, handle);
        true
    }

    /// Sets the local scale. A zero on any axis is rejected and returns
    /// `false` with the previous scale kept.
    pub fn set_scale(&mut self, handle: NodeHandle, scale: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        if !node.transform.write_scale(scale) {
            log::debug!("Rejected scale {scale} on node '{}'", node.name);
            return false;
        }
        invalidate_subtree(&self.nodes, handle);
        true
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// Local-to-world transform, recomputed only if stale.
    #[must_use]
    pub fn local_to_world(&self, handle: NodeHandle) -> Option<Affine3A> {
        resolve_world_matrix(&self.nodes, handle)
    }

    #[must_use]
    pub fn local_to_world_matrix(&self, handle: NodeHandle) -> Option<Mat4> {
        self.local_to_world(handle).map(Mat4::from)
    }

    #[must_use]
    pub fn world_to_local_matrix(&self, handle: NodeHandle) -> Option<Mat4> {
        self.local_to_world(handle).map(|m| Mat4::from(m.inverse()))
    }

    /// Resolves every stale world matrix in the attached hierarchy in one
    /// pass. Returns how many nodes were visited.
    pub fn refresh_world_matrices(&self) -> usize {
        let mut visited = 0;
        walk_world_matrices(&self.nodes, &self.roots, false, |_, _, _| visited += 1);
        visited
    }

    /// `false` for stale handles.
    #[must_use]
    pub fn is_world_matrix_dirty(&self, handle: NodeHandle) -> bool {
        self.nodes
            .get(handle)
            .is_some_and(|n| n.transform.is_world_dirty())
    }

    fn parent_world(&self, handle: NodeHandle) -> Affine3A {
        self.nodes
            .get(handle)
            .and_then(|n| n.parent)
            .and_then(|p| self.local_to_world(p))
            .unwrap_or(Affine3A::IDENTITY)
    }

    /// Accumulated rotation of the ancestors, excluding `handle` itself.
    fn parent_world_rotation(&self, handle: NodeHandle) -> Quat {
        let mut q = Quat::IDENTITY;
        let mut cursor = self.nodes.get(handle).and_then(|n| n.parent);
        while let Some(h) = cursor {
            let Some(node) = self.nodes.get(h) else {
                break;
            };
            q = node.transform.rotation().quaternion() * q;
            cursor = node.parent;
        }
        q
    }

    /// Component-wise product of the ancestors' scales.
    fn parent_world_scale(&self, handle: NodeHandle) -> Vec3 {
        let mut s = Vec3::ONE;
        let mut cursor = self.nodes.get(handle).and_then(|n| n.parent);
        while let Some(h) = cursor {
            let Some(node) = self.nodes.get(h) else {
                break;
            };
            s *= node.transform.scale();
            cursor = node.parent;
        }
        s
    }

    // ========================================================================
    // World space
    // ========================================================================

    #[must_use]
    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.local_to_world(handle).map(|m| Vec3::from(m.translation))
    }

    /// Solves for the local position that lands at `position` in world space.
    pub fn set_world_position(&mut self, handle: NodeHandle, position: Vec3) -> bool {
        if !self.nodes.contains_key(handle) {
            return false;
        }
        let local = self.parent_world(handle).inverse().transform_point3(position);
        self.set_position(handle, local)
    }

    /// Rotation composed from the root down to `handle`.
    #[must_use]
    pub fn world_rotation(&self, handle: NodeHandle) -> Option<Rotation> {
        let local = self.nodes.get(handle)?.transform.rotation().quaternion();
        Some(Rotation::from_quaternion(
            self.parent_world_rotation(handle) * local,
        ))
    }

    pub fn set_world_rotation(&mut self, handle: NodeHandle, rotation: impl Into<Rotation>) -> bool {
        if !self.nodes.contains_key(handle) {
            return false;
        }
        let world = rotation.into().quaternion();
        let local = self.parent_world_rotation(handle).inverse() * world;
        self.set_rotation(handle, local)
    }

    /// Product of the scales from the root down to `handle`.
    #[must_use]
    pub fn world_scale(&self, handle: NodeHandle) -> Option<Vec3> {
        let local = self.nodes.get(handle)?.transform.scale();
        Some(self.parent_world_scale(handle) * local)
    }

    /// Divides out the ancestors' scale. A zero axis is rejected.
    pub fn set_world_scale(&mut self, handle: NodeHandle, scale: Vec3) -> bool {
        if !self.nodes.contains_key(handle) || !is_valid_scale(scale) {
            return false;
        }
        let local = scale / self.parent_world_scale(handle);
        self.set_scale(handle, local)
    }

    // ========================================================================
    // Space-relative operations
    // ========================================================================

    /// Moves a node by `delta` expressed in `space`.
    ///
    /// - `World`: added to the world position
    /// - `Parent`: added to the local position as is
    /// - `Local`: rotated by the local rotation, then added
    pub fn translate(&mut self, handle: NodeHandle, delta: Vec3, space: Space) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        let t = &node.transform;
        match space {
            Space::World => {
                let Some(world) = self.world_position(handle) else {
                    return false;
                };
                self.set_world_position(handle, world + delta)
            }
            Space::Parent => {
                let p = t.position() + delta;
                self.set_position(handle, p)
            }
            Space::Local => {
                let p = t.position() + t.rotation().rotate_vector(delta);
                self.set_position(handle, p)
            }
        }
    }

    /// Applies `rotation` in `space`.
    ///
    /// - `World`: `rotation * world_rotation`
    /// - `Parent`: `rotation * local`, axes of the parent frame
    /// - `Local`: `local * rotation`, the node's own axes
    pub fn rotate(&mut self, handle: NodeHandle, rotation: impl Into<Rotation>, space: Space) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        let r = rotation.into().quaternion();
        let local = node.transform.rotation().quaternion();
        match space {
            Space::World => {
                let Some(world) = self.world_rotation(handle) else {
                    return false;
                };
                self.set_world_rotation(handle, r * world.quaternion())
            }
            Space::Parent => self.set_rotation(handle, r * local),
            Space::Local => self.set_rotation(handle, local * r),
        }
    }

    /// Turns the node so its +Z axis points at `target` in world space.
    ///
    /// Returns `false` and keeps the current rotation when the target
    /// coincides with the node's world position or is a stale handle.
    pub fn look_at(&mut self, handle: NodeHandle, target: impl Into<LookTarget>) -> bool {
        let Some(eye) = self.world_position(handle) else {
            return false;
        };
        let point = match target.into() {
            LookTarget::Point(p) => p,
            LookTarget::Node(other) => match self.world_position(other) {
                Some(p) => p,
                None => {
                    log::warn!("look_at: target node {other:?} not found");
                    return false;
                }
            },
        };
        if (point - eye).length_squared() <= LOOK_AT_EPSILON {
            log::debug!("look_at: target coincides with eye, rotation kept");
            return false;
        }
        self.set_world_rotation(handle, Rotation::look_at(eye, point, Vec3::Y))
    }
}
