//! Arbor Scene
//!
//! A hierarchical scene graph with lazily resolved world transforms.
//!
//! - [`Scene`]: arena owning every [`SceneNode`] and component
//! - [`Transform`]: local TRS plus a cached local-to-world matrix
//! - [`transform_system`]: world matrix resolution and subtree invalidation
//! - [`hierarchy`]: reparenting with cycle rejection, [`ChildrenMut`]
//! - [`component`]: the [`Component`] lifecycle and [`ComponentRegistry`]
//! - [`render`]: top-down render traversal into a [`RenderSink`]
//!
//! Nodes and components are addressed by [`NodeHandle`] and
//! [`ComponentHandle`]. A stale handle never panics: getters return `None`
//! and mutators return `false`.

use slotmap::new_key_type;

pub mod behaviors;
pub mod component;
pub mod hierarchy;
pub mod mesh;
pub mod node;
pub mod render;
pub mod scene;
pub mod transform;
pub mod transform_system;
pub mod wrapper;

new_key_type! {
    /// Stable key of a node in [`Scene`].
    pub struct NodeHandle;
    /// Stable key of an attached component in [`Scene`].
    pub struct ComponentHandle;
}

pub use behaviors::Spinner;
pub use component::{Component, ComponentContext, ComponentRegistry};
pub use hierarchy::ChildrenMut;
pub use mesh::{Mesh, MeshRenderer};
pub use node::SceneNode;
pub use render::{DrawItem, DrawList, RecordedDraw, RenderSink};
pub use scene::{Scene, SceneEvent};
pub use transform::{Space, Transform};
pub use transform_system::LookTarget;
pub use wrapper::NodeMut;
