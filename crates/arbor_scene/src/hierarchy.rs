//! Parent/child mutation.
//!
//! There is exactly one code path that changes a node's parent:
//! `Scene::reparent`. Both [`Scene::set_parent`] (the node side) and
//! [`ChildrenMut`] (the collection side) call into it, so the `parent` field
//! and the parent's `children` list are always updated together and each
//! effective change emits exactly one [`SceneEvent::ParentChanged`].

use crate::scene::{Scene, SceneEvent};
use crate::transform_system::invalidate_subtree;
use crate::NodeHandle;

impl Scene {
    /// Moves `child` under `parent`, or makes it parentless with `None`.
    ///
    /// Returns `true` if the parent changed. Rejected with no state change:
    /// - `parent` equals the current parent
    /// - `parent` is `child` itself or one of its descendants
    /// - either handle is stale
    ///
    /// A parentless node that was attached becomes a scene root.
    pub fn set_parent(&mut self, child: NodeHandle, parent: Option<NodeHandle>) -> bool {
        self.reparent(child, parent, None)
    }

    /// Like [`set_parent`](Self::set_parent), but keeps the node's world
    /// position, rotation and scale.
    pub fn set_parent_keep_world(&mut self, child: NodeHandle, parent: Option<NodeHandle>) -> bool {
        let (Some(position), Some(rotation), Some(scale)) = (
            self.world_position(child),
            self.world_rotation(child),
            self.world_scale(child),
        ) else {
            return false;
        };

        if !self.reparent(child, parent, None) {
            return false;
        }
        self.set_world_position(child, position);
        self.set_world_rotation(child, rotation);
        self.set_world_scale(child, scale);
        true
    }

    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|n| n.parent)
    }

    /// Children in sibling order; empty for stale handles.
    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        match self.nodes.get(handle) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Mutable view of `parent`'s child collection.
    pub fn children_mut(&mut self, parent: NodeHandle) -> Option<ChildrenMut<'_>> {
        if self.nodes.contains_key(parent) {
            Some(ChildrenMut { scene: self, parent })
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    /// `true` if `ancestor` appears strictly above `node`.
    #[must_use]
    pub fn is_descendant_of(&self, node: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut cursor = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(h) = cursor {
            if h == ancestor {
                return true;
            }
            cursor = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    /// Number of ancestors above `handle`.
    #[must_use]
    pub fn depth(&self, handle: NodeHandle) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent(handle);
        while let Some(h) = cursor {
            depth += 1;
            cursor = self.parent(h);
        }
        depth
    }

    pub(crate) fn reparent(
        &mut self,
        child: NodeHandle,
        new_parent: Option<NodeHandle>,
        index: Option<usize>,
    ) -> bool {
        let Some(node) = self.nodes.get(child) else {
            log::warn!("set_parent: node {child:?} not found");
            return false;
        };
        let old_parent = node.parent;
        let was_attached = node.attached;

        if old_parent == new_parent {
            return false;
        }
        if let Some(p) = new_parent {
            if !self.nodes.contains_key(p) {
                log::warn!("set_parent: parent {p:?} not found");
                return false;
            }
            if p == child {
                log::debug!("Cannot parent a node to itself");
                return false;
            }
            if self.is_descendant_of(p, child) {
                log::debug!("Rejected reparent: {p:?} is a descendant of {child:?}");
                return false;
            }
        }

        // Unlink
        match old_parent {
            Some(op) => {
                if let Some(o) = self.nodes.get_mut(op) {
                    o.children.retain(|&c| c != child);
                }
            }
            None => self.roots.retain(|&r| r != child),
        }

        // Link
        let attached = match new_parent {
            Some(p) => {
                let Some(pn) = self.nodes.get_mut(p) else {
                    return false;
                };
                let at = index.unwrap_or(pn.children.len()).min(pn.children.len());
                pn.children.insert(at, child);
                pn.attached
            }
            None => {
                if was_attached {
                    self.roots.push(child);
                }
                was_attached
            }
        };
        if let Some(n) = self.nodes.get_mut(child) {
            n.parent = new_parent;
        }

        if attached != was_attached {
            self.set_subtree_attached(child, attached);
        }
        invalidate_subtree(&self.nodes, child);
        self.push_event(SceneEvent::ParentChanged {
            node: child,
            old_parent,
            new_parent,
        });

        if attached && !was_attached {
            self.initialize_subtree_components(child);
        }
        true
    }

    /// Moves an existing child to `index` among its siblings. No structural
    /// event is emitted and no caches are invalidated.
    fn move_sibling(&mut self, parent: NodeHandle, child: NodeHandle, index: usize) -> bool {
        let Some(pn) = self.nodes.get_mut(parent) else {
            return false;
        };
        let Some(from) = pn.children.iter().position(|&c| c == child) else {
            return false;
        };
        pn.children.remove(from);
        let at = index.min(pn.children.len());
        pn.children.insert(at, child);
        from != at
    }
}

/// Collection-side view of one node's children.
///
/// Every mutation keeps each child's `parent` in sync and rejects
/// cycle-forming insertions, exactly as [`Scene::set_parent`] does.
pub struct ChildrenMut<'a> {
    scene: &'a mut Scene,
    parent: NodeHandle,
}

impl ChildrenMut<'_> {
    #[inline]
    #[must_use]
    pub fn parent(&self) -> NodeHandle {
        self.parent
    }

    /// Appends `child`, detaching it from its previous parent.
    pub fn add(&mut self, child: NodeHandle) -> bool {
        self.scene.reparent(child, Some(self.parent), None)
    }

    /// Inserts `child` at `index` (clamped). An existing child is reordered.
    pub fn insert(&mut self, index: usize, child: NodeHandle) -> bool {
        if self.scene.parent(child) == Some(self.parent) {
            return self.scene.move_sibling(self.parent, child, index);
        }
        self.scene.reparent(child, Some(self.parent), Some(index))
    }

    /// Removes `child` from this collection, leaving it parentless.
    pub fn remove(&mut self, child: NodeHandle) -> bool {
        if self.scene.parent(child) != Some(self.parent) {
            return false;
        }
        self.scene.reparent(child, None, None)
    }

    /// Removes every child. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let children = self.scene.children(self.parent).to_vec();
        children
            .into_iter()
            .filter(|&c| self.scene.reparent(c, None, None))
            .count()
    }

    #[must_use]
    pub fn contains(&self, child: NodeHandle) -> bool {
        self.scene.children(self.parent).contains(&child)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scene.children(self.parent).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[NodeHandle] {
        self.scene.children(self.parent)
    }
}
