//! Mesh payload and the `MeshRenderer` component.
//!
//! A [`Mesh`] is immutable once built and shared between renderers through
//! `Arc`. Construction validates buffer lengths and index ranges and fails
//! fast with [`ArborError`]: a malformed buffer is a data preparation bug,
//! not a runtime condition.

use std::sync::Arc;

use arbor_core::errors::{ArborError, Result};
use glam::{Vec2, Vec3};

use crate::component::Component;

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    uvs: Option<Vec<Vec2>>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Indexed triangle list.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(ArborError::IndexCountMismatch {
                count: indices.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(ArborError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }
        Ok(Self {
            positions,
            normals: None,
            uvs: None,
            indices,
        })
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Result<Self> {
        check_attribute("normals", self.positions.len(), normals.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Result<Self> {
        check_attribute("uvs", self.positions.len(), uvs.len())?;
        self.uvs = Some(uvs);
        Ok(self)
    }

    /// Axis-aligned cube centered on the origin.
    #[must_use]
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // -Z
            4, 5, 6, 4, 6, 7, // +Z
            0, 4, 7, 0, 7, 3, // -X
            1, 2, 6, 1, 6, 5, // +X
            0, 1, 5, 0, 5, 4, // -Y
            3, 7, 6, 3, 6, 2, // +Y
        ];
        Self {
            positions,
            normals: None,
            uvs: None,
            indices,
        }
    }

    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    #[must_use]
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle corner positions in index order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    /// Local-space bounding box `(min, max)`; `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }
}

fn check_attribute(attribute: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ArborError::AttributeLengthMismatch {
            attribute,
            expected,
            actual,
        })
    }
}

/// Draws a shared [`Mesh`] at its owner's world transform. At most one per
/// node.
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh: Option<Arc<Mesh>>,
    pub visible: bool,
}

impl MeshRenderer {
    #[must_use]
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self {
            mesh: Some(mesh),
            visible: true,
        }
    }
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self {
            mesh: None,
            visible: true,
        }
    }
}

impl Component for MeshRenderer {
    fn singleton() -> bool {
        true
    }
}
