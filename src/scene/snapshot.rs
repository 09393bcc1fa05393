//! Scene serialization.
//!
//! [`SceneSnapshot`] is the JSON-friendly mirror of a scene: tags, local
//! transforms, parent links, cameras and lights, in spawn order. Entity
//! ids are not stable across save/load; parents are referenced by index
//! into the snapshot's own entity list and fresh ids are allocated on
//! load. Mesh and material assignments are not captured, so a reloaded
//! scene restores structure and lighting but must re-attach its geometry.

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ecs::EntityId;
use crate::scene::camera::Camera;
use crate::scene::components::Tag;
use crate::scene::hierarchy::Hierarchy;
use crate::scene::light::Light;
use crate::scene::scene::Scene;
use crate::scene::transform::Transform;

/// Local TRS of one entity, rotation in Euler degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRecord {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// One serialized entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub tag: String,
    pub transform: TransformRecord,
    /// Index of the parent within [`SceneSnapshot::entities`].
    pub parent: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<Camera>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<Light>,
}

/// Serializable image of a whole scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub entities: Vec<EntityRecord>,
}

impl Scene {
    /// Captures every tagged entity in spawn order.
    #[must_use]
    pub fn to_snapshot(&self) -> SceneSnapshot {
        let mut indices: FxHashMap<EntityId, usize> = FxHashMap::default();
        let mut order: Vec<(EntityId, String)> = Vec::new();
        for (entity, tag) in self.registry.view::<Tag>() {
            indices.insert(entity, order.len());
            order.push((entity, tag.name.clone()));
        }

        let entities = order
            .into_iter()
            .map(|(entity, tag)| {
                let transform = self.registry.get::<Transform>(entity).map_or(
                    TransformRecord {
                        position: Vec3::ZERO,
                        rotation: Vec3::ZERO,
                        scale: Vec3::ONE,
                    },
                    |t| TransformRecord {
                        position: t.position,
                        rotation: t.rotation,
                        scale: t.scale,
                    },
                );
                let parent = self
                    .registry
                    .get::<Hierarchy>(entity)
                    .and_then(|h| h.parent)
                    .and_then(|p| indices.get(&p).copied());
                EntityRecord {
                    tag,
                    transform,
                    parent,
                    camera: self.registry.get::<Camera>(entity).cloned(),
                    light: self.registry.get::<Light>(entity).cloned(),
                }
            })
            .collect();

        SceneSnapshot { entities }
    }

    /// Rebuilds a scene from a snapshot with freshly allocated entity ids,
    /// then runs one hierarchy update so world matrices are ready.
    #[must_use]
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Self {
        let mut scene = Self::new();
        let mut ids = Vec::with_capacity(snapshot.entities.len());

        for record in &snapshot.entities {
            let entity = scene.create_entity(&record.tag);
            if let Some(transform) = scene.registry.get_mut::<Transform>(entity) {
                transform.position = record.transform.position;
                transform.rotation = record.transform.rotation;
                transform.scale = record.transform.scale;
            }
            if let Some(camera) = &record.camera {
                scene.registry.add(entity, camera.clone());
            }
            if let Some(light) = &record.light {
                scene.registry.add(entity, light.clone());
            }
            ids.push(entity);
        }

        // Parents link in a second pass so forward references resolve.
        for (record, &entity) in snapshot.entities.iter().zip(&ids) {
            if let Some(parent) = record.parent
                && let Some(&parent_id) = ids.get(parent)
            {
                scene.tree.set_parent(&mut scene.registry, entity, Some(parent_id));
            }
        }

        scene.update();
        scene
    }
}
