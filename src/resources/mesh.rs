//! Mesh boundary object: interleaved vertex data with local-space bounds.

use std::borrow::Cow;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use uuid::Uuid;

use crate::errors::{EmberError, Result};
use crate::render::device::{MeshId, RenderDevice};

/// Interleaved vertex layout shared by every mesh: position, normal, uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    #[must_use]
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A mesh uploaded to the render device.
///
/// Carries its axis-aligned local bounds so consumers (culling, picking
/// coverage) can reason about extent without reading vertex data back.
#[derive(Debug)]
pub struct Mesh {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,
    pub(crate) id: MeshId,
    pub vertex_count: u32,
    pub index_count: u32,
    bounds_min: Vec3,
    bounds_max: Vec3,
}

impl Mesh {
    /// Uploads vertex and index data. Rejects empty geometry and indices
    /// referencing past the vertex range.
    pub fn new(
        device: &mut dyn RenderDevice,
        name: impl Into<Cow<'static, str>>,
        vertices: &[MeshVertex],
        indices: &[u32],
    ) -> Result<Arc<Self>> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(EmberError::InvalidMesh("empty vertex or index data".into()));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(EmberError::InvalidMesh(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in vertices {
            let p = Vec3::from_array(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        let id = device.create_mesh(vertices, indices)?;
        Ok(Arc::new(Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            id,
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
            bounds_min: min,
            bounds_max: max,
        }))
    }

    /// Axis-aligned local-space bounds: `(min, max)`.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Axis-aligned cube centered at the origin, `size` on each edge.
    /// 24 vertices so each face gets its own normals, CCW winding.
    pub fn cube(device: &mut dyn RenderDevice, size: f32) -> Result<Arc<Self>> {
        let h = size * 0.5;
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            // (normal, tangent u, tangent v) per face
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (face, (n, u, v)) in faces.iter().enumerate() {
            let n = Vec3::from_array(*n);
            let u = Vec3::from_array(*u);
            let v = Vec3::from_array(*v);
            let corners = [
                (n - u - v, [0.0, 0.0]),
                (n + u - v, [1.0, 0.0]),
                (n + u + v, [1.0, 1.0]),
                (n - u + v, [0.0, 1.0]),
            ];
            for (corner, uv) in corners {
                vertices.push(MeshVertex::new((corner * h).to_array(), n.to_array(), uv));
            }
            let base = (face * 4) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::new(device, "Cube", &vertices, &indices)
    }

    /// Unit quad covering the whole normalized device range, used by the
    /// fullscreen post-processing passes.
    pub fn fullscreen_quad(device: &mut dyn RenderDevice) -> Result<Arc<Self>> {
        let vertices = [
            MeshVertex::new([-1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            MeshVertex::new([1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            MeshVertex::new([1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            MeshVertex::new([-1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        let indices = [0, 1, 2, 2, 3, 0];
        Self::new(device, "FullscreenQuad", &vertices, &indices)
    }
}
