//! Small plain-data components: tags and resource attachments.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::resources::{Material, Mesh};

/// Display name of an entity. This is the identifier persistence stores;
/// entity ids themselves are transient arena keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::new("Entity")
    }
}

/// Attaches a shared mesh resource to an entity. Invisible entities are
/// skipped at submission without touching the hierarchy.
#[derive(Debug, Clone)]
pub struct MeshComponent {
    pub mesh: Arc<Mesh>,
    pub visible: bool,
}

impl MeshComponent {
    #[must_use]
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self {
            mesh,
            visible: true,
        }
    }
}

/// Attaches a shared material resource to an entity. Entities with a mesh
/// but no material render with the renderer's default material.
#[derive(Debug, Clone)]
pub struct MaterialComponent {
    pub material: Arc<Material>,
}

impl MaterialComponent {
    #[must_use]
    pub fn new(material: Arc<Material>) -> Self {
        Self { material }
    }
}
