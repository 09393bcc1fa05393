//! Scene facade.
//!
//! [`Scene`] bundles the entity [`Registry`] with the [`SceneTree`] and
//! offers the high-level lifecycle: spawn entities with their standard
//! components, reparent them, propagate transforms once per frame, and
//! hand the result to a [`Renderer`]. Both fields stay public so systems
//! that need joint access can borrow them directly.

use glam::Mat4;

use crate::ecs::{EntityId, Registry, entity_index};
use crate::errors::Result;
use crate::render::Renderer;
use crate::scene::camera::Camera;
use crate::scene::components::{MaterialComponent, MeshComponent, Tag};
use crate::scene::hierarchy::Hierarchy;
use crate::scene::light::Light;
use crate::scene::transform::Transform;
use crate::scene::tree::SceneTree;

/// A world of entities plus the hierarchy that orders them.
#[derive(Default)]
pub struct Scene {
    pub registry: Registry,
    pub tree: SceneTree,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Entity lifecycle
    // ========================================================================

    /// Spawns a root entity carrying the standard component set:
    /// a [`Tag`], an identity [`Transform`] and an unlinked [`Hierarchy`].
    pub fn create_entity(&mut self, name: &str) -> EntityId {
        let entity = self.registry.create();
        self.registry.add(entity, Tag::new(name));
        self.registry.add(entity, Transform::new());
        self.registry.add(entity, Hierarchy::default());
        self.tree.track_root(entity);
        entity
    }

    /// Spawns an entity directly under `parent`.
    pub fn create_child(&mut self, parent: EntityId, name: &str) -> EntityId {
        let entity = self.create_entity(name);
        self.tree.set_parent(&mut self.registry, entity, Some(parent));
        entity
    }

    /// Destroys an entity and its whole subtree.
    pub fn destroy_entity(&mut self, entity: EntityId) {
        self.tree.destroy_recursive(&mut self.registry, entity);
    }

    /// Moves `child` under `parent`, or to the root set with `None`.
    /// Returns `false` when the request is rejected (unknown ids, self
    /// parenting, or a link that would close a cycle).
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> bool {
        self.tree.set_parent(&mut self.registry, child, parent)
    }

    /// Detaches `child` from its parent, keeping it in the scene as a root.
    pub fn detach(&mut self, child: EntityId) -> bool {
        self.tree.detach(&mut self.registry, child)
    }

    // ========================================================================
    // Per-frame work
    // ========================================================================

    /// Recomputes world matrices for the whole hierarchy, parents first.
    pub fn update(&mut self) {
        self.tree.update(&mut self.registry);
    }

    /// Renders through the primary camera. Does nothing when the scene has
    /// no camera marked primary.
    pub fn render(&self, renderer: &mut Renderer) {
        let Some((view, projection)) = self.primary_camera_matrices() else {
            log::debug!("no primary camera, skipping render");
            return;
        };
        self.render_with_camera(renderer, &view, &projection);
    }

    /// Renders with an externally supplied camera, as an editor viewport
    /// does. Submits every light, then every visible mesh; entities
    /// without a material fall back to the renderer's default.
    pub fn render_with_camera(&self, renderer: &mut Renderer, view: &Mat4, projection: &Mat4) {
        renderer.begin_scene(view, projection);

        for (_, transform, light) in self.registry.view2::<Transform, Light>() {
            renderer.submit_light(light, &transform.world_matrix());
        }

        let default_material = renderer.default_material().clone();
        for (entity, transform, mesh) in self.registry.view2::<Transform, MeshComponent>() {
            if !mesh.visible {
                continue;
            }
            let material = self
                .registry
                .get::<MaterialComponent>(entity)
                .map_or(&default_material, |m| &m.material);
            renderer.submit(
                material,
                &mesh.mesh,
                &transform.world_matrix(),
                entity_index(entity),
            );
        }

        renderer.end_scene();
    }

    // ========================================================================
    // Cameras and picking
    // ========================================================================

    /// First entity whose camera is marked primary, in spawn order.
    #[must_use]
    pub fn primary_camera(&self) -> Option<EntityId> {
        self.registry
            .view2::<Transform, Camera>()
            .find(|(_, _, camera)| camera.primary)
            .map(|(entity, _, _)| entity)
    }

    fn primary_camera_matrices(&self) -> Option<(Mat4, Mat4)> {
        self.registry
            .view2::<Transform, Camera>()
            .find(|(_, _, camera)| camera.primary)
            .map(|(_, transform, camera)| {
                (
                    transform.world_matrix().inverse(),
                    camera.projection_matrix(),
                )
            })
    }

    /// Pushes a viewport size to every camera that tracks it.
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        for (_, camera) in self.registry.view_mut::<Camera>() {
            camera.set_viewport(width, height);
        }
    }

    /// Resolves the entity under a framebuffer pixel via the renderer's
    /// id attachment. `Ok(None)` when the pixel is background or the
    /// entity has since been destroyed.
    pub fn entity_at_pixel(
        &self,
        renderer: &Renderer,
        x: u32,
        y: u32,
    ) -> Result<Option<EntityId>> {
        let index = renderer.entity_index_at(x, y)?;
        Ok(index.and_then(|i| self.registry.entity_from_index(i)))
    }
}

// =============================================================================
// Tests
// =============================================================================
