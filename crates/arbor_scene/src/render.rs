//! Render traversal.
//!
//! The scene does not draw anything itself. [`Scene::render`] walks the
//! active hierarchy top-down, resolves every world matrix from its parent's
//! (writing refreshed values back into the caches) and hands one
//! [`DrawItem`] per visible [`MeshRenderer`] to a [`RenderSink`].

use std::sync::Arc;

use glam::Mat4;

use crate::mesh::{Mesh, MeshRenderer};
use crate::scene::Scene;
use crate::transform_system::walk_world_matrices;
use crate::NodeHandle;

/// One draw call.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub node: NodeHandle,
    /// Local-to-world model matrix.
    pub model: Mat4,
    pub mesh: &'a Arc<Mesh>,
}

/// Consumer of draw calls, typically a graphics backend.
pub trait RenderSink {
    fn draw(&mut self, item: DrawItem<'_>);
}

/// Owned copy of a [`DrawItem`].
#[derive(Debug, Clone)]
pub struct RecordedDraw {
    pub node: NodeHandle,
    pub model: Mat4,
    pub mesh: Arc<Mesh>,
}

/// A [`RenderSink`] that records every draw call.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<RecordedDraw>,
}

impl DrawList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[RecordedDraw] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl RenderSink for DrawList {
    fn draw(&mut self, item: DrawItem<'_>) {
        self.items.push(RecordedDraw {
            node: item.node,
            model: item.model,
            mesh: Arc::clone(item.mesh),
        });
    }
}

impl Scene {
    /// Emits a draw call for every visible mesh renderer on an active node.
    /// Returns the number of draw calls.
    pub fn render(&self, sink: &mut dyn RenderSink) -> usize {
        let mut draws = 0;
        walk_world_matrices(&self.nodes, &self.roots, true, |handle, node, world| {
            for &ch in &node.components {
                let Some(renderer) = self
                    .components
                    .get(ch)
                    .and_then(|slot| slot.instance.as_deref())
                    .and_then(|c| c.downcast_ref::<MeshRenderer>())
                else {
                    continue;
                };
                if !renderer.visible {
                    continue;
                }
                if let Some(mesh) = &renderer.mesh {
                    sink.draw(DrawItem {
                        node: handle,
                        model: Mat4::from(world),
                        mesh,
                    });
                    draws += 1;
                }
            }
        });
        draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn render_refreshes_dirty_caches() {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let child = scene.spawn_child(root, "child").unwrap();
        scene.set_position(root, Vec3::X);
        scene.set_position(child, Vec3::Y);
        scene.attach_component(child, MeshRenderer::new(Arc::new(Mesh::cube(1.0))));

        let mut list = DrawList::new();
        assert_eq!(scene.render(&mut list), 1);
        assert!(!scene.is_world_matrix_dirty(root));
        assert!(!scene.is_world_matrix_dirty(child));

        let model = list.items()[0].model;
        assert!(model.w_axis.truncate().abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn hidden_or_meshless_renderers_are_skipped() {
        let mut scene = Scene::new();
        let a = scene.spawn("a");
        let b = scene.spawn("b");
        scene.add_component::<MeshRenderer>(a);
        let mut hidden = MeshRenderer::new(Arc::new(Mesh::cube(1.0)));
        hidden.visible = false;
        scene.attach_component(b, hidden);

        let mut list = DrawList::new();
        assert_eq!(scene.render(&mut list), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn inactive_subtrees_are_not_drawn() {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let child = scene.spawn_child(root, "child").unwrap();
        scene.attach_component(child, MeshRenderer::new(Arc::new(Mesh::cube(1.0))));
        scene.set_active(root, false);

        let mut list = DrawList::new();
        assert_eq!(scene.render(&mut list), 0);
    }
}
