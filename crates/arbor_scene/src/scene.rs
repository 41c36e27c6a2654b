//! The scene arena.
//!
//! [`Scene`] owns every node and every attached component in flat
//! [`SlotMap`]s. Parent, child and owner relationships are stored as
//! handles, so there are no reference cycles and no lifetimes to thread
//! through user code.
//!
//! # Lifecycle
//!
//! - [`create_node`](Scene::create_node) makes a detached node: no parent,
//!   not a root, identity transform
//! - [`add_root`](Scene::add_root) or parenting under an attached node
//!   attaches it
//! - an attached node in an initialized scene is *live*; components on live
//!   nodes receive `on_initialize` exactly once
//! - [`destroy_node`](Scene::destroy_node) removes a whole subtree and calls
//!   `on_destroy` on its components

use std::sync::Arc;

use arbor_core::ids::{IdAllocator, InstanceId, ProcessIds};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::component::ComponentSlot;
use crate::node::SceneNode;
use crate::wrapper::NodeMut;
use crate::{ComponentHandle, NodeHandle};

/// Structural change recorded while [`Scene::record_events`] is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// A node moved to a different parent. `None` means parentless.
    ParentChanged {
        node: NodeHandle,
        old_parent: Option<NodeHandle>,
        new_parent: Option<NodeHandle>,
    },
    /// A node was removed from the scene.
    NodeDestroyed { node: NodeHandle, id: InstanceId },
}

pub struct Scene {
    // ==== Arenas ====
    pub(crate) nodes: SlotMap<NodeHandle, SceneNode>,
    pub(crate) components: SlotMap<ComponentHandle, ComponentSlot>,

    // ==== Structure ====
    pub(crate) roots: Vec<NodeHandle>,
    pub(crate) names: FxHashMap<String, NodeHandle>,

    // ==== State ====
    pub(crate) initialized: bool,
    record_events: bool,
    events: Vec<SceneEvent>,

    ids: Arc<dyn IdAllocator>,
}

impl Scene {
    /// Creates an empty scene that draws ids from the process-wide counter.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_allocator(Arc::new(ProcessIds))
    }

    /// Creates an empty scene with a private id source.
    #[must_use]
    pub fn with_id_allocator(ids: Arc<dyn IdAllocator>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            components: SlotMap::with_key(),
            roots: Vec::new(),
            names: FxHashMap::default(),
            initialized: false,
            record_events: false,
            events: Vec::new(),
            ids,
        }
    }

    /// Marks the scene initialized and initializes every component on an
    /// attached node. Idempotent.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        log::trace!("Scene initialized with {} nodes", self.nodes.len());

        for root in self.roots.clone() {
            self.initialize_subtree_components(root);
        }
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ========================================================================
    // Node creation & destruction
    // ========================================================================

    /// Creates a detached node. A colliding name receives a ` (n)` suffix.
    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        let id = self.ids.allocate();
        let name = self.unique_name(name);
        let handle = self.nodes.insert(SceneNode::new(id, name.clone()));
        self.names.insert(name, handle);
        handle
    }

    /// Creates a node and makes it a scene root.
    pub fn spawn(&mut self, name: &str) -> NodeHandle {
        let handle = self.create_node(name);
        self.add_root(handle);
        handle
    }

    /// Creates a node as the last child of `parent`.
    pub fn spawn_child(&mut self, parent: NodeHandle, name: &str) -> Option<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            log::warn!("spawn_child: parent {parent:?} not found");
            return None;
        }
        let handle = self.create_node(name);
        self.set_parent(handle, Some(parent));
        Some(handle)
    }

    /// Attaches a detached, parentless node as a scene root.
    ///
    /// Returns `false` if the node is already attached or has a parent.
    pub fn add_root(&mut self, handle: NodeHandle) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            log::warn!("add_root: node {handle:?} not found");
            return false;
        };
        if node.attached || node.parent.is_some() {
            return false;
        }
        self.roots.push(handle);
        self.set_subtree_attached(handle, true);
        self.initialize_subtree_components(handle);
        true
    }

    /// Removes `handle` and its whole subtree.
    ///
    /// Components on removed nodes get `on_destroy`; names are released.
    pub fn destroy_node(&mut self, handle: NodeHandle) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };

        match node.parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent) {
                    p.children.retain(|&c| c != handle);
                }
            }
            None => self.roots.retain(|&r| r != handle),
        }

        for h in self.collect_subtree(handle) {
            let Some(node) = self.nodes.remove(h) else {
                continue;
            };
            for ch in node.components {
                self.release_component(ch);
            }
            if self.names.get(&node.name) == Some(&h) {
                self.names.remove(&node.name);
            }
            log::trace!("Destroyed node '{}' {}", node.name, node.id);
            self.push_event(SceneEvent::NodeDestroyed { node: h, id: node.id });
        }
        true
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    /// Chainable mutable view of one node.
    #[inline]
    pub fn node(&mut self, handle: NodeHandle) -> NodeMut<'_> {
        NodeMut::new(self, handle)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode)> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.names.get(name).copied()
    }

    /// Nodes whose tag equals `tag`, in arena order.
    pub fn find_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = NodeHandle> + 'a {
        self.nodes
            .iter()
            .filter(move |(_, n)| !tag.is_empty() && n.tag == tag)
            .map(|(h, _)| h)
    }

    // ========================================================================
    // Identity
    // ========================================================================

    #[must_use]
    pub fn name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(SceneNode::name)
    }

    /// Renames a node, returning the name actually assigned.
    pub fn set_name(&mut self, handle: NodeHandle, name: &str) -> Option<&str> {
        let current = self.nodes.get(handle)?.name.clone();
        if current != name {
            if self.names.get(&current) == Some(&handle) {
                self.names.remove(&current);
            }
            let unique = self.unique_name(name);
            self.names.insert(unique.clone(), handle);
            self.nodes.get_mut(handle)?.name = unique;
        }
        self.nodes.get(handle).map(SceneNode::name)
    }

    pub fn set_tag(&mut self, handle: NodeHandle, tag: impl Into<String>) -> bool {
        match self.nodes.get_mut(handle) {
            Some(node) => {
                node.tag = tag.into();
                true
            }
            None => false,
        }
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.names.contains_key(base) {
            return base.to_owned();
        }
        (1u32..)
            .map(|n| format!("{base} ({n})"))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_else(|| base.to_owned())
    }

    // ========================================================================
    // Activity & liveness
    // ========================================================================

    pub fn set_active(&mut self, handle: NodeHandle, active: bool) -> bool {
        match self.nodes.get_mut(handle) {
            Some(node) => {
                node.active = active;
                true
            }
            None => false,
        }
    }

    /// Own flag AND every ancestor's flag. `false` for stale handles.
    #[must_use]
    pub fn is_active(&self, handle: NodeHandle) -> bool {
        let mut cursor = Some(handle);
        while let Some(h) = cursor {
            match self.nodes.get(h) {
                Some(node) if node.active => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    #[must_use]
    pub fn is_active_self(&self, handle: NodeHandle) -> bool {
        self.nodes.get(handle).is_some_and(|n| n.active)
    }

    /// Attached to the scene tree and the scene is initialized.
    #[must_use]
    pub fn is_live(&self, handle: NodeHandle) -> bool {
        self.initialized && self.nodes.get(handle).is_some_and(|n| n.attached)
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Runs one update pass over every active attached node.
    ///
    /// Initializes the scene on first call. Nodes are visited pre-order,
    /// components in attachment order. Structural changes made by a
    /// component take effect immediately: children are read after the
    /// node's own components have run. A node moved under a later parent
    /// is still visited at most once per pass.
    pub fn update(&mut self, dt: f32) {
        self.initialize();
        let mut visited = FxHashSet::default();
        for root in self.roots.clone() {
            self.update_subtree(root, dt, &mut visited);
        }
    }

    /// Updates one independently scheduled subtree.
    ///
    /// Does nothing unless `handle` is active including its ancestors.
    pub fn update_node(&mut self, handle: NodeHandle, dt: f32) {
        self.initialize();
        if self.is_active(handle) {
            self.update_subtree(handle, dt, &mut FxHashSet::default());
        }
    }

    fn update_subtree(
        &mut self,
        root: NodeHandle,
        dt: f32,
        visited: &mut FxHashSet<NodeHandle>,
    ) {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if !node.active || !visited.insert(handle) {
                continue;
            }

            for ch in node.components.clone() {
                self.update_component(ch, dt);
            }

            if let Some(node) = self.nodes.get(handle) {
                stack.extend(node.children.iter().rev());
            }
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Enables or disables the structural event journal.
    ///
    /// Disabling discards pending events.
    pub fn record_events(&mut self, enabled: bool) {
        self.record_events = enabled;
        if !enabled {
            self.events.clear();
        }
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: SceneEvent) {
        if self.record_events {
            self.events.push(event);
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Pre-order list of `root` and its descendants.
    pub(crate) fn collect_subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(h) = stack.pop() {
            if let Some(node) = self.nodes.get(h) {
                out.push(h);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    pub(crate) fn set_subtree_attached(&mut self, root: NodeHandle, attached: bool) {
        for h in self.collect_subtree(root) {
            if let Some(node) = self.nodes.get_mut(h) {
                node.attached = attached;
            }
        }
    }

    /// Initializes pending components in `root`'s subtree if it is live.
    pub(crate) fn initialize_subtree_components(&mut self, root: NodeHandle) {
        if !self.is_live(root) {
            return;
        }
        for h in self.collect_subtree(root) {
            let pending: Vec<ComponentHandle> = self
                .nodes
                .get(h)
                .map(|n| n.components.clone())
                .unwrap_or_default();
            for ch in pending {
                self.initialize_component(ch);
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("components", &self.components.len())
            .field("roots", &self.roots)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::ids::SequentialIds;

    fn scene() -> Scene {
        Scene::with_id_allocator(Arc::new(SequentialIds::new()))
    }

    #[test]
    fn injected_allocator_gives_deterministic_ids() {
        let mut s = scene();
        let a = s.create_node("a");
        let b = s.create_node("b");
        assert_eq!(s.get_node(a).map(|n| n.id().raw()), Some(1));
        assert_eq!(s.get_node(b).map(|n| n.id().raw()), Some(2));
    }

    #[test]
    fn duplicate_names_get_suffixes() {
        let mut s = scene();
        let a = s.create_node("Cube");
        let b = s.create_node("Cube");
        let c = s.create_node("Cube");
        assert_eq!(s.name(a), Some("Cube"));
        assert_eq!(s.name(b), Some("Cube (1)"));
        assert_eq!(s.name(c), Some("Cube (2)"));
        assert_eq!(s.find_by_name("Cube (1)"), Some(b));
    }

    #[test]
    fn rename_releases_old_name() {
        let mut s = scene();
        let a = s.create_node("Old");
        assert_eq!(s.set_name(a, "New"), Some("New"));
        assert_eq!(s.find_by_name("Old"), None);
        let b = s.create_node("Old");
        assert_eq!(s.name(b), Some("Old"));
    }

    #[test]
    fn destroy_frees_names_and_subtree() {
        let mut s = scene();
        let root = s.spawn("root");
        let child = s.spawn_child(root, "child").unwrap();
        assert!(s.destroy_node(root));
        assert!(!s.contains(child));
        assert_eq!(s.find_by_name("child"), None);
        assert_eq!(s.node_count(), 0);
        assert!(!s.destroy_node(root));
    }

    #[test]
    fn create_node_is_detached() {
        let mut s = scene();
        let n = s.create_node("n");
        s.initialize();
        assert!(!s.get_node(n).unwrap().is_attached());
        assert!(!s.is_live(n));
        assert!(s.add_root(n));
        assert!(s.is_live(n));
        assert!(!s.add_root(n));
    }

    #[test]
    fn active_is_hierarchical() {
        let mut s = scene();
        let a = s.spawn("a");
        let b = s.spawn_child(a, "b").unwrap();
        s.set_active(a, false);
        assert!(!s.is_active(b));
        assert!(s.is_active_self(b));
        s.set_active(a, true);
        assert!(s.is_active(b));
    }

    #[test]
    fn tags_are_searchable() {
        let mut s = scene();
        let a = s.spawn("a");
        s.spawn("b");
        s.set_tag(a, "Player");
        assert_eq!(s.find_by_tag("Player").collect::<Vec<_>>(), vec![a]);
        assert_eq!(s.find_by_tag("").count(), 0);
    }

    #[test]
    fn events_are_opt_in() {
        let mut s = scene();
        let a = s.spawn("a");
        s.destroy_node(a);
        assert!(s.drain_events().is_empty());

        s.record_events(true);
        let b = s.spawn("b");
        s.destroy_node(b);
        let events = s.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SceneEvent::NodeDestroyed { node, .. } if node == b));
    }
}
