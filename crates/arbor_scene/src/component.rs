//! Component attachment and lifecycle.
//!
//! Components are boxed trait objects stored in the scene's component arena
//! and referenced from their owner node by [`ComponentHandle`].
//!
//! # Lifecycle
//!
//! 1. Attached to exactly one node with [`Scene::add_component`],
//!    [`Scene::attach_component`] or [`Scene::add_component_by_name`].
//! 2. `on_initialize` runs once, as soon as the owner is live: immediately
//!    if it already is, otherwise when the owner joins an initialized scene.
//! 3. `on_update` runs every [`Scene::update`] pass while the owner is
//!    active.
//! 4. `on_destroy` runs when the component or its owner is destroyed.
//!
//! While a callback runs its component is taken out of its slot, which is
//! what lets the callback hold `&mut Scene`. A callback that destroys its
//! own component sees `on_destroy` run right after it returns.

use std::any::{Any, TypeId, type_name};

use arbor_core::errors::{ArborError, Result};
use rustc_hash::FxHashMap;

use crate::behaviors::Spinner;
use crate::mesh::MeshRenderer;
use crate::scene::Scene;
use crate::wrapper::NodeMut;
use crate::{ComponentHandle, NodeHandle};

/// Behavior or data attached to a scene node.
pub trait Component: Any {
    fn on_initialize(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn on_update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {}

    fn on_destroy(&mut self) {}

    /// At most one instance per node. A second add returns the first.
    fn singleton() -> bool
    where
        Self: Sized,
    {
        false
    }
}

impl dyn Component {
    #[inline]
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}

/// Access to the scene from inside a component callback.
pub struct ComponentContext<'a> {
    scene: &'a mut Scene,
    owner: NodeHandle,
    handle: ComponentHandle,
}

impl ComponentContext<'_> {
    /// The node this component is attached to.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> NodeHandle {
        self.owner
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> ComponentHandle {
        self.handle
    }

    #[inline]
    pub fn scene(&mut self) -> &mut Scene {
        self.scene
    }

    #[inline]
    #[must_use]
    pub fn scene_ref(&self) -> &Scene {
        self.scene
    }

    /// Chainable view of the owner node.
    #[inline]
    pub fn node(&mut self) -> NodeMut<'_> {
        NodeMut::new(self.scene, self.owner)
    }
}

pub(crate) struct ComponentSlot {
    pub(crate) owner: NodeHandle,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) initialized: bool,
    /// `None` while the component's own callback is running.
    pub(crate) instance: Option<Box<dyn Component>>,
}

// ============================================================================
// Factory registry
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct ComponentFactory {
    type_id: TypeId,
    type_name: &'static str,
    singleton: bool,
    create: fn() -> Box<dyn Component>,
}

fn create_default<T: Component + Default>() -> Box<dyn Component> {
    Box::new(T::default())
}

/// Name-to-constructor table for prefab and scripting callers.
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    factories: FxHashMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `MeshRenderer` and `Spinner`.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register::<MeshRenderer>("MeshRenderer")
            .register::<Spinner>("Spinner");
        registry
    }

    /// Registers `T` under `name`, replacing any previous entry.
    pub fn register<T: Component + Default>(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        let factory = ComponentFactory {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            singleton: T::singleton(),
            create: create_default::<T>,
        };
        if self.factories.insert(name.clone(), factory).is_some() {
            log::debug!("Component factory '{name}' replaced");
        }
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Builds a fresh default instance of the component registered as `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Component>> {
        self.factories
            .get(name)
            .map(|f| (f.create)())
            .ok_or_else(|| ArborError::UnknownComponentType(name.to_owned()))
    }
}

// ============================================================================
// Scene API
// ============================================================================

impl Scene {
    /// Creates a default `T` on `handle`.
    ///
    /// For singleton types an existing instance is returned instead.
    pub fn add_component<T: Component + Default>(
        &mut self,
        handle: NodeHandle,
    ) -> Option<ComponentHandle> {
        if T::singleton()
            && let Some(existing) = self.find_component(handle, TypeId::of::<T>())
        {
            return Some(existing);
        }
        self.attach_component(handle, T::default())
    }

    /// Attaches an already constructed component.
    ///
    /// For singleton types with an instance already present, `component` is
    /// dropped and the existing handle returned.
    pub fn attach_component<T: Component>(
        &mut self,
        handle: NodeHandle,
        component: T,
    ) -> Option<ComponentHandle> {
        self.attach_boxed(
            handle,
            Box::new(component),
            TypeId::of::<T>(),
            type_name::<T>(),
            T::singleton(),
        )
    }

    /// Creates the component registered as `name` on `handle`.
    pub fn add_component_by_name(
        &mut self,
        registry: &ComponentRegistry,
        handle: NodeHandle,
        name: &str,
    ) -> Result<ComponentHandle> {
        let factory = *registry
            .factories
            .get(name)
            .ok_or_else(|| ArborError::UnknownComponentType(name.to_owned()))?;
        if !self.nodes.contains_key(handle) {
            return Err(ArborError::NodeNotFound);
        }
        if factory.singleton
            && let Some(existing) = self.find_component(handle, factory.type_id)
        {
            return Ok(existing);
        }
        self.attach_boxed(
            handle,
            (factory.create)(),
            factory.type_id,
            factory.type_name,
            factory.singleton,
        )
        .ok_or(ArborError::NodeNotFound)
    }

    fn attach_boxed(
        &mut self,
        handle: NodeHandle,
        instance: Box<dyn Component>,
        type_id: TypeId,
        type_name: &'static str,
        singleton: bool,
    ) -> Option<ComponentHandle> {
        if !self.nodes.contains_key(handle) {
            log::warn!("Cannot attach {type_name}: node {handle:?} not found");
            return None;
        }
        if singleton && let Some(existing) = self.find_component(handle, type_id) {
            log::debug!("{type_name} is a singleton, returning existing instance");
            return Some(existing);
        }

        let ch = self.components.insert(ComponentSlot {
            owner: handle,
            type_id,
            type_name,
            initialized: false,
            instance: Some(instance),
        });
        self.nodes.get_mut(handle)?.components.push(ch);

        if self.is_live(handle) {
            self.initialize_component(ch);
        }
        Some(ch)
    }

    fn find_component(&self, handle: NodeHandle, type_id: TypeId) -> Option<ComponentHandle> {
        self.nodes.get(handle)?.components.iter().copied().find(|&ch| {
            self.components
                .get(ch)
                .is_some_and(|slot| slot.type_id == type_id)
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// First component of type `T` on `handle`.
    #[must_use]
    pub fn get_component<T: Component>(&self, handle: NodeHandle) -> Option<&T> {
        let ch = self.find_component(handle, TypeId::of::<T>())?;
        self.component::<T>(ch)
    }

    pub fn get_component_mut<T: Component>(&mut self, handle: NodeHandle) -> Option<&mut T> {
        let ch = self.find_component(handle, TypeId::of::<T>())?;
        self.component_mut::<T>(ch)
    }

    #[must_use]
    pub fn has_component<T: Component>(&self, handle: NodeHandle) -> bool {
        self.find_component(handle, TypeId::of::<T>()).is_some()
    }

    /// Component behind `ch`, if it is a `T`.
    #[must_use]
    pub fn component<T: Component>(&self, ch: ComponentHandle) -> Option<&T> {
        self.components.get(ch)?.instance.as_deref()?.downcast_ref::<T>()
    }

    pub fn component_mut<T: Component>(&mut self, ch: ComponentHandle) -> Option<&mut T> {
        self.components
            .get_mut(ch)?
            .instance
            .as_deref_mut()?
            .downcast_mut::<T>()
    }

    /// Attached components in attachment order. The transform is not listed.
    #[must_use]
    pub fn components(&self, handle: NodeHandle) -> &[ComponentHandle] {
        match self.nodes.get(handle) {
            Some(node) => &node.components,
            None => &[],
        }
    }

    #[must_use]
    pub fn component_owner(&self, ch: ComponentHandle) -> Option<NodeHandle> {
        self.components.get(ch).map(|slot| slot.owner)
    }

    #[must_use]
    pub fn component_type_name(&self, ch: ComponentHandle) -> Option<&'static str> {
        self.components.get(ch).map(|slot| slot.type_name)
    }

    #[must_use]
    pub fn is_component_initialized(&self, ch: ComponentHandle) -> bool {
        self.components.get(ch).is_some_and(|slot| slot.initialized)
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Detaches and drops a component, calling its `on_destroy`.
    pub fn destroy_component(&mut self, ch: ComponentHandle) -> bool {
        let Some(owner) = self.component_owner(ch) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(owner) {
            node.components.retain(|&c| c != ch);
        }
        self.release_component(ch);
        true
    }

    /// Runs `f` with the component taken out of its slot.
    ///
    /// Returns `None` for stale handles and while the component's own
    /// callback is already running.
    pub fn with_component<R>(
        &mut self,
        ch: ComponentHandle,
        f: impl FnOnce(&mut (dyn Component + 'static), &mut ComponentContext<'_>) -> R,
    ) -> Option<R> {
        let slot = self.components.get_mut(ch)?;
        let owner = slot.owner;
        let mut instance = slot.instance.take()?;

        let mut ctx = ComponentContext {
            scene: self,
            owner,
            handle: ch,
        };
        let result = f(&mut *instance, &mut ctx);

        match self.components.get_mut(ch) {
            Some(slot) => slot.instance = Some(instance),
            None => {
                // Destroyed by its own callback
                instance.on_destroy();
            }
        }
        Some(result)
    }

    /// Typed form of [`with_component`](Self::with_component).
    pub fn with_component_as<T: Component, R>(
        &mut self,
        ch: ComponentHandle,
        f: impl FnOnce(&mut T, &mut ComponentContext<'_>) -> R,
    ) -> Option<R> {
        self.with_component(ch, |c, ctx| {
            c.downcast_mut::<T>().map(|t| f(t, ctx))
        })
        .flatten()
    }

    /// Initializes `ch` if its owner is live. Returns whether the component
    /// is initialized afterwards.
    pub(crate) fn initialize_component(&mut self, ch: ComponentHandle) -> bool {
        let Some(slot) = self.components.get(ch) else {
            return false;
        };
        if slot.initialized {
            return true;
        }
        let (owner, type_name) = (slot.owner, slot.type_name);
        if !self.is_live(owner) {
            return false;
        }

        if let Some(slot) = self.components.get_mut(ch) {
            slot.initialized = true;
        }
        log::trace!("Initializing {type_name} on {owner:?}");
        self.with_component(ch, |c, ctx| c.on_initialize(ctx));
        self.components.contains_key(ch)
    }

    pub(crate) fn update_component(&mut self, ch: ComponentHandle, dt: f32) {
        if self.initialize_component(ch) {
            self.with_component(ch, |c, ctx| c.on_update(ctx, dt));
        }
    }

    /// Removes the slot and calls `on_destroy` unless the instance is
    /// currently out of its slot, in which case `with_component` does it.
    pub(crate) fn release_component(&mut self, ch: ComponentHandle) {
        if let Some(slot) = self.components.remove(ch) {
            log::trace!("Destroying {} on {:?}", slot.type_name, slot.owner);
            if let Some(mut instance) = slot.instance {
                instance.on_destroy();
            }
        }
    }
}
