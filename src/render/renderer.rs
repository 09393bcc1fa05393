//! Frame pipeline.
//!
//! [`Renderer`] owns the render targets and drives one frame as
//! `begin_scene` → `submit_light`* / `submit`* → `end_scene`. The scene
//! pass draws into an HDR color target plus an entity-id target used for
//! mouse picking; `end_scene` then tone-maps the HDR image and composites
//! the result back for presentation or readback.
//!
//! Lights run one frame late on purpose: submissions made during frame N
//! are uploaded at the start of frame N+1, so the very first frame is lit
//! by an empty array. Callers that pre-seed lights before the first
//! `begin_scene` get them applied from frame one.

use std::sync::Arc;

use bytemuck::Zeroable;
use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::errors::{EmberError, Result};
use crate::render::device::{
    AttachmentFormat, BufferId, FramebufferDesc, FramebufferId, RenderDevice,
};
use crate::render::uniforms::{
    CAMERA_BINDING, CameraUniforms, GpuLight, LIGHT_BINDING, LightBlock, MAX_LIGHTS,
};
use crate::resources::material::MAP_BINDINGS;
use crate::resources::{Material, Mesh, Shader, ShaderSource, Texture};
use crate::scene::{Light, LightKind};

const TONE_MAPPING_SRC: &str = include_str!("../../shaders/tone_mapping.glsl");
const COMPOSITE_SRC: &str = include_str!("../../shaders/composite.glsl");
const STANDARD_SRC: &str = include_str!("../../shaders/standard.glsl");

/// Color attachment slot of the HDR scene target.
const MAIN_COLOR: u32 = 0;
/// Color attachment slot of the entity-id target.
const ENTITY_ID: u32 = 1;
/// Entity-id value written by the clear, meaning "no entity here".
const ENTITY_INDEX_SENTINEL: u32 = 0x00ff_ffff;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Tone mapping operator applied by the post-processing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneMapping {
    /// No tone mapping (linear passthrough).
    Linear,
    /// Reinhard operator (classic, soft highlights).
    Reinhard,
    /// Cineon film emulation.
    Cineon,
    /// ACES filmic (industry standard).
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    /// Mode index matching the shader-side switch.
    #[inline]
    #[must_use]
    pub fn index(self) -> i32 {
        match self {
            Self::Linear => 0,
            Self::Reinhard => 1,
            Self::Cineon => 2,
            Self::AcesFilmic => 3,
        }
    }
}

/// Global configuration for renderer construction.
///
/// Consumed once by [`Renderer::new`]; `exposure` and `tone_mapping` may be
/// changed afterwards through [`Renderer::settings_mut`].
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Initial render target size in pixels.
    pub width: u32,
    pub height: u32,
    /// Background clear color of the HDR scene target.
    pub clear_color: Vec4,
    /// When `false`, `end_scene` skips tone mapping and compositing and the
    /// raw HDR image is left in the main target.
    pub post_processing: bool,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            clear_color: Vec4::new(0.1, 0.1, 0.1, 1.0),
            post_processing: true,
            tone_mapping: ToneMapping::default(),
            exposure: 1.0,
        }
    }
}

/// Per-frame draw statistics, reset by `begin_scene`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: u32,
    pub vertices: u32,
    pub indices: u32,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Owns the frame pipeline state for one render device.
pub struct Renderer {
    device: Box<dyn RenderDevice>,
    settings: RendererSettings,
    size: (u32, u32),

    main_target: FramebufferId,
    post_target: FramebufferId,
    camera_buffer: BufferId,
    light_buffer: BufferId,

    tonemap_shader: Arc<Shader>,
    composite_shader: Arc<Shader>,
    fullscreen_quad: Arc<Mesh>,
    white_texture: Arc<Texture>,
    default_material: Arc<Material>,

    /// Lights submitted this frame, uploaded at the next `begin_scene`.
    lights: Vec<GpuLight>,
    light_overflow_warned: bool,

    stats: RenderStats,
    in_frame: bool,
    pending_resize: Option<(u32, u32)>,
}

impl Renderer {
    /// Builds the render targets, uniform buffers and built-in pipeline
    /// resources on the given device.
    ///
    /// # Errors
    ///
    /// Returns [`EmberError::InvalidFramebufferSize`] for a zero-sized
    /// initial size, or a device error when resource creation fails.
    pub fn new(mut device: Box<dyn RenderDevice>, settings: RendererSettings) -> Result<Self> {
        if settings.width == 0 || settings.height == 0 {
            return Err(EmberError::InvalidFramebufferSize {
                width: settings.width,
                height: settings.height,
            });
        }

        let main_target = device.create_framebuffer(&FramebufferDesc {
            label: "main",
            width: settings.width,
            height: settings.height,
            colors: vec![AttachmentFormat::RgbaF32, AttachmentFormat::Rgba8],
            depth_stencil: true,
        })?;
        let post_target = device.create_framebuffer(&FramebufferDesc {
            label: "post",
            width: settings.width,
            height: settings.height,
            colors: vec![AttachmentFormat::Rgba8],
            depth_stencil: false,
        })?;

        let camera_buffer =
            device.create_uniform_buffer(size_of::<CameraUniforms>(), CAMERA_BINDING)?;
        let light_buffer = device.create_uniform_buffer(size_of::<LightBlock>(), LIGHT_BINDING)?;

        let tonemap_shader = Shader::compile(
            device.as_mut(),
            "ToneMapping",
            &ShaderSource::parse("ToneMapping", TONE_MAPPING_SRC)?,
        )?;
        let composite_shader = Shader::compile(
            device.as_mut(),
            "Composite",
            &ShaderSource::parse("Composite", COMPOSITE_SRC)?,
        )?;
        let standard_shader = Shader::compile(
            device.as_mut(),
            "Standard",
            &ShaderSource::parse("Standard", STANDARD_SRC)?,
        )?;

        let fullscreen_quad = Mesh::fullscreen_quad(device.as_mut())?;
        let white_texture = Texture::white(device.as_mut())?;
        let default_material = Arc::new(Material::new(standard_shader, "Default"));

        log::info!(
            "renderer initialized ({}x{}, post-processing: {})",
            settings.width,
            settings.height,
            settings.post_processing
        );

        let size = (settings.width, settings.height);
        Ok(Self {
            device,
            settings,
            size,
            main_target,
            post_target,
            camera_buffer,
            light_buffer,
            tonemap_shader,
            composite_shader,
            fullscreen_quad,
            white_texture,
            default_material,
            lights: Vec::with_capacity(MAX_LIGHTS),
            light_overflow_warned: false,
            stats: RenderStats::default(),
            in_frame: false,
            pending_resize: None,
        })
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Starts a frame: applies any pending resize, resets the statistics,
    /// uploads the camera block and last frame's light array, then clears
    /// the scene targets.
    pub fn begin_scene(&mut self, view: &Mat4, projection: &Mat4) {
        if self.in_frame {
            log::error!("begin_scene called while a frame is already open");
            return;
        }
        self.in_frame = true;

        if let Some((width, height)) = self.pending_resize.take() {
            self.apply_resize(width, height);
        }

        self.stats = RenderStats::default();

        let camera = CameraUniforms::new(view, projection);
        self.device
            .update_buffer(self.camera_buffer, bytemuck::bytes_of(&camera));

        // Last frame's lights go up before the list is reset.
        let mut block = LightBlock::zeroed();
        let count = self.lights.len().min(MAX_LIGHTS);
        block.lights[..count].copy_from_slice(&self.lights[..count]);
        block.count = count as u32;
        self.device
            .update_buffer(self.light_buffer, bytemuck::bytes_of(&block));
        self.lights.clear();
        self.light_overflow_warned = false;

        self.device.bind_framebuffer(self.main_target);
        self.device
            .set_draw_buffers(self.main_target, &[MAIN_COLOR, ENTITY_ID]);
        self.device.set_depth_test(true);
        self.device.set_depth_write(true);
        self.device
            .clear_color(self.main_target, MAIN_COLOR, self.settings.clear_color.to_array());
        self.device
            .clear_color(self.main_target, ENTITY_ID, [1.0, 1.0, 1.0, 1.0]);
        self.device.clear_depth(self.main_target);
    }

    /// Queues a light for the next frame's array.
    ///
    /// `world` supplies the light's position and forward (-Z) axis.
    /// Submissions beyond [`MAX_LIGHTS`] are dropped with a warning.
    pub fn submit_light(&mut self, light: &Light, world: &Mat4) {
        if !self.in_frame {
            log::error!("submit_light called outside begin_scene/end_scene");
            return;
        }
        if self.lights.len() >= MAX_LIGHTS {
            if !self.light_overflow_warned {
                log::warn!("light cap ({MAX_LIGHTS}) reached, dropping further lights");
                self.light_overflow_warned = true;
            }
            return;
        }

        let position = world.w_axis.truncate();
        let direction = (*world * Vec4::new(0.0, 0.0, -1.0, 0.0))
            .truncate()
            .normalize_or_zero();

        let mut packed = GpuLight {
            color: light.color,
            intensity: light.intensity,
            position,
            direction,
            ..GpuLight::default()
        };
        match light.kind {
            LightKind::Directional => packed.light_type = 0,
            LightKind::Point { range } => {
                packed.light_type = 1;
                packed.range = range;
            }
            LightKind::Spot {
                range,
                inner_deg,
                outer_deg,
            } => {
                packed.light_type = 2;
                packed.range = range;
                packed.inner_cone_cos = inner_deg.to_radians().cos();
                packed.outer_cone_cos = outer_deg.to_radians().cos();
            }
        }
        self.lights.push(packed);
    }

    /// Draws one mesh with the given material and model matrix,
    /// tagging the covered pixels with `entity_index` for picking.
    pub fn submit(&mut self, material: &Material, mesh: &Mesh, transform: &Mat4, entity_index: u32) {
        if !self.in_frame {
            log::error!("submit called outside begin_scene/end_scene");
            return;
        }

        let shader = material.shader();
        self.device.bind_shader(shader.id());

        self.device.set_uniform_mat4("u_Model", transform);
        let normal_matrix = Mat3::from_mat4(transform.inverse().transpose());
        self.device.set_uniform_mat3("u_NormalMatrix", &normal_matrix);

        self.device.set_uniform_vec4("u_BaseColor", material.base_color);
        self.device.set_uniform_f32("u_Metallic", material.metallic);
        self.device.set_uniform_f32("u_Roughness", material.roughness);
        self.device.set_uniform_vec3("u_Emissive", material.emissive);

        let flags = material.flags();
        for binding in &MAP_BINDINGS {
            let map = if flags.contains(binding.flag) {
                material.map_for(binding.flag)
            } else {
                None
            };
            self.device.set_uniform_bool(binding.toggle, map.is_some());
            let texture = map.map_or_else(|| self.white_texture.id(), |m| m.id());
            self.device.bind_texture(texture, binding.slot);
            self.device
                .set_uniform_i32(binding.sampler, binding.slot as i32);
        }

        self.device
            .set_uniform_vec3("u_EntityColor", encode_entity_index(entity_index));

        self.device.draw_mesh(mesh.id());
        self.stats.draw_calls += 1;
        self.stats.vertices += mesh.vertex_count;
        self.stats.indices += mesh.index_count;
    }

    /// Finishes the frame. With post-processing enabled this tone-maps the
    /// HDR target into the post target and composites the result back into
    /// the main color attachment, with depth writes masked throughout so
    /// the fullscreen quads never touch the scene depth buffer.
    pub fn end_scene(&mut self) {
        if !self.in_frame {
            log::error!("end_scene called without begin_scene");
            return;
        }

        if self.settings.post_processing {
            self.device.set_depth_test(false);
            self.device.set_depth_write(false);

            // HDR -> LDR into the post target.
            self.device.bind_framebuffer(self.post_target);
            self.device.set_draw_buffers(self.post_target, &[0]);
            self.device.bind_shader(self.tonemap_shader.id());
            if let Some(hdr) = self.device.color_texture(self.main_target, MAIN_COLOR) {
                self.device.bind_texture(hdr, 0);
            }
            self.device.set_uniform_i32("u_HdrColor", 0);
            self.device.set_uniform_f32("u_Exposure", self.settings.exposure);
            self.device
                .set_uniform_i32("u_ToneMapping", self.settings.tone_mapping.index());
            self.device.draw_mesh(self.fullscreen_quad.id());

            // Composite back into the main color attachment only; the
            // entity-id attachment keeps its scene-pass contents.
            self.device.bind_framebuffer(self.main_target);
            self.device.set_draw_buffers(self.main_target, &[MAIN_COLOR]);
            self.device.bind_shader(self.composite_shader.id());
            if let Some(ldr) = self.device.color_texture(self.post_target, 0) {
                self.device.bind_texture(ldr, 0);
            }
            self.device.set_uniform_i32("u_Source", 0);
            self.device.draw_mesh(self.fullscreen_quad.id());

            self.device.set_depth_test(true);
            self.device.set_depth_write(true);
        }

        self.device.unbind_framebuffer();
        self.in_frame = false;
    }

    // ------------------------------------------------------------------
    // Picking
    // ------------------------------------------------------------------

    /// Reads the entity index under a pixel of the scene targets.
    ///
    /// Returns `Ok(None)` when the pixel was not covered this frame.
    /// Coordinates are framebuffer-relative with `(0, 0)` at the bottom
    /// left; callers flip window coordinates and clamp to the viewport.
    ///
    /// # Errors
    ///
    /// Returns [`EmberError::ReadbackOutOfBounds`] for coordinates outside
    /// the current target size.
    pub fn entity_index_at(&self, x: u32, y: u32) -> Result<Option<u32>> {
        let pixel = self.device.read_pixel(self.main_target, ENTITY_ID, x, y)?;
        Ok(decode_entity_index(pixel))
    }

    // ------------------------------------------------------------------
    // Resize and accessors
    // ------------------------------------------------------------------

    /// Requests a render target resize, deferred to the next `begin_scene`.
    /// Zero-sized requests (minimized window) are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("ignoring zero-sized resize request ({width}x{height})");
            return;
        }
        self.pending_resize = Some((width, height));
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.size {
            return;
        }
        if let Err(err) = self.device.resize_framebuffer(self.main_target, width, height) {
            log::error!("main target resize failed: {err}");
            return;
        }
        if let Err(err) = self.device.resize_framebuffer(self.post_target, width, height) {
            log::error!("post target resize failed: {err}");
            return;
        }
        self.size = (width, height);
        log::debug!("render targets resized to {width}x{height}");
    }

    /// Current render target size in pixels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    /// Material used for meshes submitted without one.
    #[inline]
    #[must_use]
    pub fn default_material(&self) -> &Arc<Material> {
        &self.default_material
    }

    /// The scene framebuffer, for overlay passes that draw on top of the
    /// finished frame.
    #[inline]
    #[must_use]
    pub fn main_framebuffer(&self) -> FramebufferId {
        self.main_target
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &dyn RenderDevice {
        self.device.as_ref()
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut dyn RenderDevice {
        self.device.as_mut()
    }

    /// Tears the renderer down. Dropping has the same effect; this form
    /// makes the teardown point explicit.
    pub fn shutdown(self) {
        log::info!("renderer shut down");
    }
}

// ---------------------------------------------------------------------------
// Entity-id encoding
// ---------------------------------------------------------------------------

/// Packs an entity index into the RGB channels of the id attachment,
/// one byte per channel, low byte in red.
fn encode_entity_index(index: u32) -> Vec3 {
    debug_assert!(
        index < ENTITY_INDEX_SENTINEL,
        "entity index {index} collides with the clear sentinel"
    );
    Vec3::new(
        (index & 0xff) as f32 / 255.0,
        ((index >> 8) & 0xff) as f32 / 255.0,
        ((index >> 16) & 0xff) as f32 / 255.0,
    )
}

fn decode_entity_index(pixel: [u8; 4]) -> Option<u32> {
    let index =
        u32::from(pixel[0]) | (u32::from(pixel[1]) << 8) | (u32::from(pixel[2]) << 16);
    if index == ENTITY_INDEX_SENTINEL {
        None
    } else {
        Some(index)
    }
}

// =============================================================================
// Tests
// =============================================================================
