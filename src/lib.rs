#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod ecs;
pub mod errors;
pub mod render;
pub mod resources;
pub mod scene;

pub use ecs::{EntityId, Registry};
pub use errors::{EmberError, Result};
pub use render::{
    DebugRenderer, HeadlessDevice, RenderDevice, Renderer, RendererSettings, ToneMapping,
};
pub use resources::{Material, MaterialFlags, Mesh, MeshVertex, Shader, ShaderSource, Texture};
pub use scene::{
    Camera, Hierarchy, Light, LightKind, MaterialComponent, MeshComponent, ProjectionKind, Scene,
    SceneSnapshot, SceneTree, Tag, Transform,
};
