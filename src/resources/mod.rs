//! Shared render resources.
//!
//! Boundary objects the core treats as opaque GPU-bound data:
//! - `ShaderSource` / `Shader`: program text and its compiled handle
//! - `Texture`: an image the device sampled from a slot
//! - `Material`: shading parameters plus optional texture maps
//! - `Mesh`: vertex/index data with local-space bounds
//!
//! All of these are produced once, shared via `Arc`, and identified by a
//! `Uuid` so device-side caches can key on stable identity.

pub mod material;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use material::{Material, MaterialFlags};
pub use mesh::{Mesh, MeshVertex};
pub use shader::{Shader, ShaderSource};
pub use texture::Texture;
