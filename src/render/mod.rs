//! Rendering: the device boundary, the frame pipeline and debug drawing.
//!
//! [`Renderer`] runs the per-frame pass sequence against any
//! [`RenderDevice`] implementation; [`HeadlessDevice`] is the CPU-only one
//! used by the test suite. [`DebugRenderer`] batches overlay lines drawn on
//! top of a finished frame.

pub mod debug_draw;
pub mod device;
pub mod headless;
pub mod renderer;
pub mod uniforms;

pub use debug_draw::{DEBUG_VERTEX_CAPACITY, DebugRenderer};
pub use device::{
    AttachmentFormat, BufferId, FramebufferDesc, FramebufferId, MeshId, RenderDevice, ShaderId,
    TextureId,
};
pub use headless::{DrawEvent, DrawKind, HeadlessDevice, UniformValue};
pub use renderer::{RenderStats, Renderer, RendererSettings, ToneMapping};
pub use uniforms::MAX_LIGHTS;
