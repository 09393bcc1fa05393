//! Batched debug line rendering.
//!
//! [`DebugRenderer`] collects colored line segments into one CPU-side batch
//! and draws the whole batch with a single call in [`DebugRenderer::flush`].
//! Shapes (boxes, spheres, arrows, frusta) are tessellated into lines at
//! submission time. The batch has a fixed vertex capacity; segments past
//! the cap are dropped for the rest of the frame.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::errors::Result;
use crate::render::device::{BufferId, FramebufferId, RenderDevice};
use crate::resources::{Shader, ShaderSource};

const LINE_SRC: &str = include_str!("../../shaders/debug_line.glsl");

/// Default batch capacity, in vertices (two per segment).
pub const DEBUG_VERTEX_CAPACITY: usize = 40_960;

/// Segments per debug circle.
const CIRCLE_SEGMENTS: usize = 32;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LineVertex {
    position: Vec3,
    color: Vec3,
}

/// Immediate-mode line batch drawn over the finished frame.
pub struct DebugRenderer {
    shader: Arc<Shader>,
    buffer: BufferId,
    vertices: Vec<LineVertex>,
    capacity: usize,
    /// Master switch; submissions are ignored while `false`.
    pub enabled: bool,
}

impl DebugRenderer {
    /// Creates a batch with the default capacity.
    pub fn new(device: &mut dyn RenderDevice) -> Result<Self> {
        Self::with_capacity(device, DEBUG_VERTEX_CAPACITY)
    }

    /// Creates a batch holding at most `capacity` vertices.
    pub fn with_capacity(device: &mut dyn RenderDevice, capacity: usize) -> Result<Self> {
        let shader = Shader::compile(
            device,
            "DebugLine",
            &ShaderSource::parse("DebugLine", LINE_SRC)?,
        )?;
        let buffer = device.create_vertex_buffer(capacity * size_of::<LineVertex>())?;
        Ok(Self {
            shader,
            buffer,
            vertices: Vec::with_capacity(capacity),
            capacity,
            enabled: true,
        })
    }

    // ------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------

    /// Queues one line segment.
    pub fn line(&mut self, from: Vec3, to: Vec3, color: Vec3) {
        if !self.enabled || self.vertices.len() + 2 > self.capacity {
            return;
        }
        self.vertices.push(LineVertex {
            position: from,
            color,
        });
        self.vertices.push(LineVertex {
            position: to,
            color,
        });
    }

    /// Queues the 12 edges of an axis-aligned box.
    pub fn aabb(&mut self, min: Vec3, max: Vec3, color: Vec3) {
        self.box_edges(&Mat4::IDENTITY, min, max, color);
    }

    /// Queues the 12 edges of a box transformed by `world`. Pass a mesh's
    /// local bounds and its world matrix to outline the mesh.
    pub fn obb(&mut self, world: &Mat4, min: Vec3, max: Vec3, color: Vec3) {
        self.box_edges(world, min, max, color);
    }

    fn box_edges(&mut self, world: &Mat4, min: Vec3, max: Vec3, color: Vec3) {
        let corners = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ]
        .map(|c| world.transform_point3(c));

        const EDGES: [(usize, usize); 12] = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        for (a, b) in EDGES {
            self.line(corners[a], corners[b], color);
        }
    }

    /// Queues a wire sphere as three orthogonal circles.
    pub fn sphere(&mut self, center: Vec3, radius: f32, color: Vec3) {
        self.circle(center, radius, Vec3::X, Vec3::Y, color);
        self.circle(center, radius, Vec3::Y, Vec3::Z, color);
        self.circle(center, radius, Vec3::Z, Vec3::X, color);
    }

    fn circle(&mut self, center: Vec3, radius: f32, u: Vec3, v: Vec3, color: Vec3) {
        let step = std::f32::consts::TAU / CIRCLE_SEGMENTS as f32;
        let mut prev = center + u * radius;
        for i in 1..=CIRCLE_SEGMENTS {
            let angle = step * i as f32;
            let next = center + (u * angle.cos() + v * angle.sin()) * radius;
            self.line(prev, next, color);
            prev = next;
        }
    }

    /// Queues an arrow from `from` to `to` with a four-line head at the tip.
    pub fn arrow(&mut self, from: Vec3, to: Vec3, color: Vec3) {
        let axis = to - from;
        let length = axis.length();
        if length < 1e-6 {
            return;
        }
        let dir = axis / length;
        // Any vector not parallel to the shaft works as a basis seed.
        let seed = if dir.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
        let side = dir.cross(seed).normalize();
        let up = dir.cross(side);

        self.line(from, to, color);
        let head = length * 0.2;
        let base = to - dir * head;
        let spread = head * 0.5;
        self.line(to, base + side * spread, color);
        self.line(to, base - side * spread, color);
        self.line(to, base + up * spread, color);
        self.line(to, base - up * spread, color);
    }

    /// Queues the 12 edges of a camera frustum, unprojected from clip
    /// space through `inv_view_projection`.
    pub fn frustum(&mut self, inv_view_projection: &Mat4, color: Vec3) {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let x = if i & 1 == 0 { -1.0 } else { 1.0 };
            let y = if i & 2 == 0 { -1.0 } else { 1.0 };
            let z = if i & 4 == 0 { -1.0 } else { 1.0 };
            let clip = *inv_view_projection * Vec4::new(x, y, z, 1.0);
            *corner = clip.truncate() / clip.w;
        }

        const EDGES: [(usize, usize); 12] = [
            // near plane
            (0, 1),
            (1, 3),
            (3, 2),
            (2, 0),
            // far plane
            (4, 5),
            (5, 7),
            (7, 6),
            (6, 4),
            // connecting edges
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        for (a, b) in EDGES {
            self.line(corners[a], corners[b], color);
        }
    }

    // ------------------------------------------------------------------
    // Flush
    // ------------------------------------------------------------------

    /// Uploads the batch and draws it into `target` with a single call,
    /// then resets the batch. Depth writes stay masked so lines never
    /// alter the scene depth buffer.
    pub fn flush(&mut self, device: &mut dyn RenderDevice, target: FramebufferId) {
        if self.vertices.is_empty() {
            return;
        }

        device.bind_framebuffer(target);
        device.set_draw_buffers(target, &[0]);
        device.update_buffer(self.buffer, bytemuck::cast_slice(&self.vertices));
        device.bind_shader(self.shader.id());
        device.set_depth_test(true);
        device.set_depth_write(false);
        device.draw_lines(self.buffer, self.vertices.len() as u32);
        device.set_depth_write(true);
        device.unbind_framebuffer();

        self.vertices.clear();
    }

    /// Discards all queued segments without drawing.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Number of vertices currently queued.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
