//! Render device boundary.
//!
//! The core drives the GPU through this trait and nothing else: concrete
//! graphics APIs live behind it as swappable implementations. The surface
//! is deliberately immediate-mode (bind framebuffer, bind shader, set named
//! uniforms, draw) because that is the contract the frame pipeline is
//! written against; a retained-mode backend is free to batch internally.
//!
//! All handles are generational keys owned by the device. Binding a stale
//! handle is a logged no-op, not a panic; creation is the only fallible
//! step.

use std::any::Any;

use glam::{Mat3, Mat4, Vec3, Vec4};
use slotmap::new_key_type;

use crate::errors::Result;
use crate::resources::{MeshVertex, ShaderSource};

new_key_type! {
    pub struct FramebufferId;
    pub struct BufferId;
    pub struct ShaderId;
    pub struct TextureId;
    pub struct MeshId;
}

/// Pixel format of a color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentFormat {
    /// 32-bit float RGBA, the HDR scene target.
    RgbaF32,
    /// 8-bit normalized RGBA.
    Rgba8,
}

/// Off-screen render target description.
#[derive(Debug, Clone)]
pub struct FramebufferDesc {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    /// Color attachments in slot order.
    pub colors: Vec<AttachmentFormat>,
    pub depth_stencil: bool,
}

/// The GPU service boundary.
///
/// Uniform setters apply to the currently bound shader; clears and draw
/// target selection apply to named framebuffers so a deferred backend can
/// validate them. `read_pixel` only supports `Rgba8` attachments, which is
/// all the picking path needs.
pub trait RenderDevice {
    // ------------------------------------------------------------------
    // Framebuffers
    // ------------------------------------------------------------------
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<FramebufferId>;
    fn resize_framebuffer(&mut self, fb: FramebufferId, width: u32, height: u32) -> Result<()>;
    fn bind_framebuffer(&mut self, fb: FramebufferId);
    fn unbind_framebuffer(&mut self);
    /// Restricts subsequent draws to the listed color attachments.
    fn set_draw_buffers(&mut self, fb: FramebufferId, attachments: &[u32]);
    fn clear_color(&mut self, fb: FramebufferId, attachment: u32, value: [f32; 4]);
    fn clear_depth(&mut self, fb: FramebufferId);
    /// Reads one pixel of an `Rgba8` attachment. `(0, 0)` is the bottom-left
    /// corner; callers flip window coordinates before calling.
    fn read_pixel(&self, fb: FramebufferId, attachment: u32, x: u32, y: u32) -> Result<[u8; 4]>;
    /// Texture backing a color attachment, for sampling in later passes.
    fn color_texture(&self, fb: FramebufferId, attachment: u32) -> Option<TextureId>;
    fn framebuffer_size(&self, fb: FramebufferId) -> Option<(u32, u32)>;

    // ------------------------------------------------------------------
    // Buffers
    // ------------------------------------------------------------------
    /// Creates a uniform block bound at `binding` for every shader.
    fn create_uniform_buffer(&mut self, size: usize, binding: u32) -> Result<BufferId>;
    /// Creates a streaming vertex buffer for line batches.
    fn create_vertex_buffer(&mut self, capacity: usize) -> Result<BufferId>;
    fn update_buffer(&mut self, buffer: BufferId, data: &[u8]);

    // ------------------------------------------------------------------
    // Shaders
    // ------------------------------------------------------------------
    fn create_shader(&mut self, name: &str, source: &ShaderSource) -> Result<ShaderId>;
    fn bind_shader(&mut self, shader: ShaderId);
    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4);
    fn set_uniform_mat3(&mut self, name: &str, value: &Mat3);
    fn set_uniform_vec4(&mut self, name: &str, value: Vec4);
    fn set_uniform_vec3(&mut self, name: &str, value: Vec3);
    fn set_uniform_f32(&mut self, name: &str, value: f32);
    fn set_uniform_i32(&mut self, name: &str, value: i32);
    fn set_uniform_bool(&mut self, name: &str, value: bool);

    // ------------------------------------------------------------------
    // Textures
    // ------------------------------------------------------------------
    /// Uploads tightly packed RGBA8 pixels.
    fn create_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureId>;
    fn bind_texture(&mut self, texture: TextureId, slot: u32);

    // ------------------------------------------------------------------
    // Geometry and draws
    // ------------------------------------------------------------------
    fn create_mesh(&mut self, vertices: &[MeshVertex], indices: &[u32]) -> Result<MeshId>;
    /// Indexed draw of a whole mesh with the bound shader and framebuffer.
    fn draw_mesh(&mut self, mesh: MeshId);
    /// Line-list draw of the first `vertex_count` vertices in `buffer`.
    fn draw_lines(&mut self, buffer: BufferId, vertex_count: u32);

    // ------------------------------------------------------------------
    // Raster state
    // ------------------------------------------------------------------
    fn set_depth_test(&mut self, enabled: bool);
    fn set_depth_write(&mut self, enabled: bool);

    // ------------------------------------------------------------------
    // Downcasting (test devices)
    // ------------------------------------------------------------------
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
