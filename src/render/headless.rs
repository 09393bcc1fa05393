//! In-memory render device.
//!
//! [`HeadlessDevice`] implements the full [`RenderDevice`] contract without
//! touching a GPU, which makes the frame pipeline testable in CI. It keeps
//! real attachment storage and a log of every draw, and it approximates the
//! scene pass closely enough for picking tests: each `draw_mesh` projects
//! the mesh bounds through the current camera and model matrices and stamps
//! the covered pixel rectangle into the entity-id attachment. There is no
//! depth buffer, so overlapping draws resolve to whichever came last.

use std::any::Any;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::errors::{EmberError, Result};
use crate::render::device::{
    AttachmentFormat, BufferId, FramebufferDesc, FramebufferId, MeshId, RenderDevice, ShaderId,
    TextureId,
};
use crate::render::uniforms::{CAMERA_BINDING, CameraUniforms};
use crate::resources::{MeshVertex, ShaderSource};

/// One uniform value, stored by name on the owning shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Mat3(Mat3),
    Vec4(Vec4),
    Vec3(Vec3),
    F32(f32),
    I32(i32),
    Bool(bool),
}

/// What a recorded draw rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Mesh(MeshId),
    Lines { vertex_count: u32 },
}

/// Pipeline state captured at the moment of a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawEvent {
    pub target: Option<FramebufferId>,
    pub shader: Option<ShaderId>,
    pub kind: DrawKind,
    pub depth_test: bool,
    pub depth_write: bool,
}

enum Plane {
    Rgba8(Vec<u8>),
    RgbaF32(Vec<f32>),
}

impl Plane {
    fn new(format: AttachmentFormat, width: u32, height: u32) -> Self {
        let pixels = width as usize * height as usize;
        match format {
            AttachmentFormat::Rgba8 => Self::Rgba8(vec![0; pixels * 4]),
            AttachmentFormat::RgbaF32 => Self::RgbaF32(vec![0.0; pixels * 4]),
        }
    }

    fn clear(&mut self, value: [f32; 4]) {
        match self {
            Self::Rgba8(bytes) => {
                let rgba = value.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
                for pixel in bytes.chunks_exact_mut(4) {
                    pixel.copy_from_slice(&rgba);
                }
            }
            Self::RgbaF32(floats) => {
                for pixel in floats.chunks_exact_mut(4) {
                    pixel.copy_from_slice(&value);
                }
            }
        }
    }
}

struct FramebufferData {
    label: &'static str,
    width: u32,
    height: u32,
    formats: Vec<AttachmentFormat>,
    colors: Vec<Plane>,
    color_textures: Vec<TextureId>,
    draw_buffers: Vec<u32>,
    has_depth: bool,
}

struct BufferData {
    bytes: Vec<u8>,
    capacity: usize,
    /// Uniform block binding, `None` for vertex buffers.
    binding: Option<u32>,
}

struct ShaderData {
    name: String,
    uniforms: FxHashMap<String, UniformValue>,
}

struct TextureData {
    width: u32,
    height: u32,
}

struct MeshData {
    vertex_count: u32,
    index_count: u32,
    bounds_min: Vec3,
    bounds_max: Vec3,
}

/// CPU-only [`RenderDevice`] implementation.
#[derive(Default)]
pub struct HeadlessDevice {
    framebuffers: SlotMap<FramebufferId, FramebufferData>,
    buffers: SlotMap<BufferId, BufferData>,
    shaders: SlotMap<ShaderId, ShaderData>,
    textures: SlotMap<TextureId, TextureData>,
    meshes: SlotMap<MeshId, MeshData>,

    bound_framebuffer: Option<FramebufferId>,
    bound_shader: Option<ShaderId>,
    depth_test: bool,
    depth_write: bool,

    draw_events: Vec<DrawEvent>,
}

impl HeadlessDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every draw recorded since construction or the last
    /// [`clear_draw_events`](Self::clear_draw_events), in call order.
    #[must_use]
    pub fn draw_events(&self) -> &[DrawEvent] {
        &self.draw_events
    }

    pub fn clear_draw_events(&mut self) {
        self.draw_events.clear();
    }

    /// Current contents of a buffer, as last uploaded.
    #[must_use]
    pub fn buffer_bytes(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(buffer).map(|b| b.bytes.as_slice())
    }

    /// Contents of the uniform buffer bound at `binding`.
    #[must_use]
    pub fn uniform_buffer(&self, binding: u32) -> Option<&[u8]> {
        self.buffers
            .values()
            .find(|b| b.binding == Some(binding))
            .map(|b| b.bytes.as_slice())
    }

    /// Last value set for a named uniform on a shader.
    #[must_use]
    pub fn uniform(&self, shader: ShaderId, name: &str) -> Option<&UniformValue> {
        self.shaders.get(shader).and_then(|s| s.uniforms.get(name))
    }

    /// Name a shader was created with.
    #[must_use]
    pub fn shader_name(&self, shader: ShaderId) -> Option<&str> {
        self.shaders.get(shader).map(|s| s.name.as_str())
    }

    /// Size of a texture, tracking attachment resizes.
    #[must_use]
    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(texture).map(|t| (t.width, t.height))
    }

    /// `(vertex_count, index_count)` of an uploaded mesh.
    #[must_use]
    pub fn mesh_counts(&self, mesh: MeshId) -> Option<(u32, u32)> {
        self.meshes.get(mesh).map(|m| (m.vertex_count, m.index_count))
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let Some(shader) = self.bound_shader.and_then(|id| self.shaders.get_mut(id)) else {
            log::warn!("uniform '{name}' set with no shader bound");
            return;
        };
        shader.uniforms.insert(name.to_string(), value);
    }

    fn bound_uniform(&self, name: &str) -> Option<UniformValue> {
        let shader = self.bound_shader.and_then(|id| self.shaders.get(id))?;
        shader.uniforms.get(name).copied()
    }

    /// View-projection from the camera uniform block, identity before the
    /// first upload.
    fn camera_view_projection(&self) -> Mat4 {
        for buffer in self.buffers.values() {
            if buffer.binding == Some(CAMERA_BINDING)
                && buffer.bytes.len() >= size_of::<CameraUniforms>()
            {
                let camera: CameraUniforms =
                    bytemuck::pod_read_unaligned(&buffer.bytes[..size_of::<CameraUniforms>()]);
                return camera.view_projection;
            }
        }
        Mat4::IDENTITY
    }

    /// Stamps the screen rectangle covered by a mesh's bounds into the
    /// entity-id attachment of the bound framebuffer.
    fn rasterize_entity_rect(&mut self, mesh: MeshId) {
        let Some(fb_id) = self.bound_framebuffer else {
            return;
        };
        // Only scene-pass draws carry an entity color.
        let Some(UniformValue::Vec3(entity_color)) = self.bound_uniform("u_EntityColor") else {
            return;
        };
        let Some(UniformValue::Mat4(model)) = self.bound_uniform("u_Model") else {
            return;
        };
        let Some(mesh_data) = self.meshes.get(mesh) else {
            return;
        };
        let (bounds_min, bounds_max) = (mesh_data.bounds_min, mesh_data.bounds_max);
        let mvp = self.camera_view_projection() * model;

        let Some(fb) = self.framebuffers.get_mut(fb_id) else {
            return;
        };
        if !fb.draw_buffers.contains(&1) {
            return;
        }
        let (width, height) = (fb.width, fb.height);
        let Some(Plane::Rgba8(plane)) = fb.colors.get_mut(1) else {
            return;
        };

        let mut lo = Vec2::splat(f32::INFINITY);
        let mut hi = Vec2::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { bounds_min.x } else { bounds_max.x },
                if i & 2 == 0 { bounds_min.y } else { bounds_max.y },
                if i & 4 == 0 { bounds_min.z } else { bounds_max.z },
            );
            let clip = mvp * corner.extend(1.0);
            if clip.w <= 1e-6 {
                continue;
            }
            let ndc = clip.truncate() / clip.w;
            let pixel = Vec2::new(
                (ndc.x * 0.5 + 0.5) * width as f32,
                (ndc.y * 0.5 + 0.5) * height as f32,
            );
            lo = lo.min(pixel);
            hi = hi.max(pixel);
        }
        if lo.x > hi.x || hi.x < 0.0 || hi.y < 0.0 {
            return;
        }
        if lo.x >= width as f32 || lo.y >= height as f32 {
            return;
        }

        let x0 = lo.x.max(0.0) as usize;
        let y0 = lo.y.max(0.0) as usize;
        let x1 = hi.x.min(width as f32 - 1.0) as usize;
        let y1 = hi.y.min(height as f32 - 1.0) as usize;
        let rgba = [
            (entity_color.x.clamp(0.0, 1.0) * 255.0).round() as u8,
            (entity_color.y.clamp(0.0, 1.0) * 255.0).round() as u8,
            (entity_color.z.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ];
        for y in y0..=y1 {
            let row = y * width as usize;
            for x in x0..=x1 {
                let at = (row + x) * 4;
                plane[at..at + 4].copy_from_slice(&rgba);
            }
        }
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<FramebufferId> {
        if desc.width == 0 || desc.height == 0 {
            return Err(EmberError::InvalidFramebufferSize {
                width: desc.width,
                height: desc.height,
            });
        }
        let colors: Vec<Plane> = desc
            .colors
            .iter()
            .map(|&format| Plane::new(format, desc.width, desc.height))
            .collect();
        let color_textures: Vec<TextureId> = desc
            .colors
            .iter()
            .map(|_| {
                self.textures.insert(TextureData {
                    width: desc.width,
                    height: desc.height,
                })
            })
            .collect();
        Ok(self.framebuffers.insert(FramebufferData {
            label: desc.label,
            width: desc.width,
            height: desc.height,
            formats: desc.colors.clone(),
            colors,
            color_textures,
            draw_buffers: (0..desc.colors.len() as u32).collect(),
            has_depth: desc.depth_stencil,
        }))
    }

    fn resize_framebuffer(&mut self, fb: FramebufferId, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(EmberError::InvalidFramebufferSize { width, height });
        }
        let Some(data) = self.framebuffers.get_mut(fb) else {
            return Err(EmberError::Device("resize of unknown framebuffer".into()));
        };
        data.width = width;
        data.height = height;
        data.colors = data
            .formats
            .iter()
            .map(|&format| Plane::new(format, width, height))
            .collect();
        for &texture in &data.color_textures {
            if let Some(tex) = self.textures.get_mut(texture) {
                tex.width = width;
                tex.height = height;
            }
        }
        Ok(())
    }

    fn bind_framebuffer(&mut self, fb: FramebufferId) {
        if self.framebuffers.contains_key(fb) {
            self.bound_framebuffer = Some(fb);
        } else {
            log::warn!("bind of unknown framebuffer ignored");
        }
    }

    fn unbind_framebuffer(&mut self) {
        self.bound_framebuffer = None;
    }

    fn set_draw_buffers(&mut self, fb: FramebufferId, attachments: &[u32]) {
        if let Some(data) = self.framebuffers.get_mut(fb) {
            data.draw_buffers = attachments.to_vec();
        }
    }

    fn clear_color(&mut self, fb: FramebufferId, attachment: u32, value: [f32; 4]) {
        let Some(plane) = self
            .framebuffers
            .get_mut(fb)
            .and_then(|data| data.colors.get_mut(attachment as usize))
        else {
            log::warn!("clear of unknown color attachment {attachment} ignored");
            return;
        };
        plane.clear(value);
    }

    fn clear_depth(&mut self, fb: FramebufferId) {
        if !self.framebuffers.get(fb).is_some_and(|data| data.has_depth) {
            log::warn!("depth clear on framebuffer without depth ignored");
        }
    }

    fn read_pixel(&self, fb: FramebufferId, attachment: u32, x: u32, y: u32) -> Result<[u8; 4]> {
        let Some(data) = self.framebuffers.get(fb) else {
            return Err(EmberError::Device("readback from unknown framebuffer".into()));
        };
        if x >= data.width || y >= data.height {
            return Err(EmberError::ReadbackOutOfBounds {
                x,
                y,
                width: data.width,
                height: data.height,
            });
        }
        match data.colors.get(attachment as usize) {
            Some(Plane::Rgba8(plane)) => {
                let at = (y as usize * data.width as usize + x as usize) * 4;
                Ok([plane[at], plane[at + 1], plane[at + 2], plane[at + 3]])
            }
            Some(Plane::RgbaF32(_)) => Err(EmberError::Device(format!(
                "readback of float attachment {attachment} on '{}' unsupported",
                data.label
            ))),
            None => Err(EmberError::Device(format!(
                "framebuffer '{}' has no color attachment {attachment}",
                data.label
            ))),
        }
    }

    fn color_texture(&self, fb: FramebufferId, attachment: u32) -> Option<TextureId> {
        self.framebuffers
            .get(fb)
            .and_then(|data| data.color_textures.get(attachment as usize).copied())
    }

    fn framebuffer_size(&self, fb: FramebufferId) -> Option<(u32, u32)> {
        self.framebuffers.get(fb).map(|data| (data.width, data.height))
    }

    fn create_uniform_buffer(&mut self, size: usize, binding: u32) -> Result<BufferId> {
        Ok(self.buffers.insert(BufferData {
            bytes: vec![0; size],
            capacity: size,
            binding: Some(binding),
        }))
    }

    fn create_vertex_buffer(&mut self, capacity: usize) -> Result<BufferId> {
        Ok(self.buffers.insert(BufferData {
            bytes: Vec::new(),
            capacity,
            binding: None,
        }))
    }

    fn update_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        let Some(target) = self.buffers.get_mut(buffer) else {
            log::warn!("update of unknown buffer ignored");
            return;
        };
        if data.len() > target.capacity {
            log::warn!(
                "buffer update of {} bytes truncated to capacity {}",
                data.len(),
                target.capacity
            );
        }
        let len = data.len().min(target.capacity);
        if target.bytes.len() < len {
            target.bytes.resize(len, 0);
        }
        target.bytes[..len].copy_from_slice(&data[..len]);
    }

    fn create_shader(&mut self, name: &str, source: &ShaderSource) -> Result<ShaderId> {
        for (stage, text) in [("vertex", &source.vertex), ("fragment", &source.fragment)] {
            if text.trim().is_empty() {
                return Err(EmberError::ShaderCompile {
                    name: name.to_string(),
                    diagnostic: format!("{stage} stage is empty"),
                });
            }
        }
        Ok(self.shaders.insert(ShaderData {
            name: name.to_string(),
            uniforms: FxHashMap::default(),
        }))
    }

    fn bind_shader(&mut self, shader: ShaderId) {
        if self.shaders.contains_key(shader) {
            self.bound_shader = Some(shader);
        } else {
            log::warn!("bind of unknown shader ignored");
        }
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) {
        self.set_uniform(name, UniformValue::Mat4(*value));
    }

    fn set_uniform_mat3(&mut self, name: &str, value: &Mat3) {
        self.set_uniform(name, UniformValue::Mat3(*value));
    }

    fn set_uniform_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_uniform_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::F32(value));
    }

    fn set_uniform_i32(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::I32(value));
    }

    fn set_uniform_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    fn create_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureId> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(EmberError::Device(format!(
                "texture upload of {} bytes, expected {expected} for {width}x{height}",
                pixels.len()
            )));
        }
        Ok(self.textures.insert(TextureData { width, height }))
    }

    fn bind_texture(&mut self, texture: TextureId, slot: u32) {
        if !self.textures.contains_key(texture) {
            log::warn!("bind of unknown texture to slot {slot} ignored");
        }
    }

    fn create_mesh(&mut self, vertices: &[MeshVertex], indices: &[u32]) -> Result<MeshId> {
        if vertices.is_empty() {
            return Err(EmberError::InvalidMesh("mesh has no vertices".into()));
        }
        let mut bounds_min = Vec3::splat(f32::INFINITY);
        let mut bounds_max = Vec3::splat(f32::NEG_INFINITY);
        for vertex in vertices {
            let position = Vec3::from_array(vertex.position);
            bounds_min = bounds_min.min(position);
            bounds_max = bounds_max.max(position);
        }
        Ok(self.meshes.insert(MeshData {
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
            bounds_min,
            bounds_max,
        }))
    }

    fn draw_mesh(&mut self, mesh: MeshId) {
        if !self.meshes.contains_key(mesh) {
            log::warn!("draw of unknown mesh ignored");
            return;
        }
        self.draw_events.push(DrawEvent {
            target: self.bound_framebuffer,
            shader: self.bound_shader,
            kind: DrawKind::Mesh(mesh),
            depth_test: self.depth_test,
            depth_write: self.depth_write,
        });
        self.rasterize_entity_rect(mesh);
    }

    fn draw_lines(&mut self, buffer: BufferId, vertex_count: u32) {
        if !self.buffers.contains_key(buffer) {
            log::warn!("line draw from unknown buffer ignored");
            return;
        }
        self.draw_events.push(DrawEvent {
            target: self.bound_framebuffer,
            shader: self.bound_shader,
            kind: DrawKind::Lines { vertex_count },
            depth_test: self.depth_test,
            depth_write: self.depth_write,
        });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
