//! # Arbor
//!
//! A retained-mode 3D scene graph: a hierarchy of positioned nodes carrying
//! behavior and mesh components, with world transforms resolved lazily and
//! invalidated precisely on every structural or local change.
//!
//! This crate re-exports the member crates:
//!
//! - [`core`]: `Angle`, `Rotation`, instance ids and `ArborError`
//! - [`scene`]: `Scene`, `Transform`, hierarchy, components and rendering
//! - [`app`]: `LoopSettings`, `FrameClock` and `FramePump`
//!
//! # Example
//!
//! ```rust,ignore
//! use arbor::prelude::*;
//!
//! let mut scene = Scene::new();
//! let body = scene.spawn("Body");
//! let arm = scene.spawn_child(body, "Arm").unwrap();
//!
//! scene.node(body).set_euler_angles(Vec3::new(0.0, 90.0, 0.0));
//! scene.node(arm).set_position(Vec3::new(0.0, 0.0, 2.0));
//!
//! // Arm's +Z offset is turned onto +X by the parent's yaw
//! assert!(scene.world_position(arm).unwrap().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
//! ```

pub use arbor_app as app;
pub use arbor_core as core;
pub use arbor_scene as scene;

pub use arbor_core::errors::{ArborError, Result};

pub mod prelude {
    pub use arbor_app::{FrameClock, FramePump, LoopSettings, PumpReport};
    pub use arbor_core::ids::{IdAllocator, InstanceId, SequentialIds};
    pub use arbor_core::math::{Angle, Rotation};
    pub use arbor_core::errors::{ArborError, Result};
    pub use arbor_scene::{
        ChildrenMut, Component, ComponentContext, ComponentHandle, ComponentRegistry, DrawItem,
        DrawList, LookTarget, Mesh, MeshRenderer, NodeHandle, NodeMut, RenderSink, Scene,
        SceneEvent, Space, Spinner,
    };
    pub use glam::{Affine3A, Mat3, Mat4, Quat, Vec3};
}
