//! Scene graph: components, the hierarchy, and the [`Scene`] facade.

pub mod camera;
pub mod components;
pub mod hierarchy;
pub mod light;
pub mod scene;
pub mod snapshot;
pub mod transform;
pub mod tree;

pub use camera::{Camera, ProjectionKind};
pub use components::{MaterialComponent, MeshComponent, Tag};
pub use hierarchy::Hierarchy;
pub use light::{Light, LightKind};
pub use scene::Scene;
pub use snapshot::{EntityRecord, SceneSnapshot, TransformRecord};
pub use transform::Transform;
pub use tree::{Ancestors, Children, SceneTree, ancestors, children, collect_subtree};
