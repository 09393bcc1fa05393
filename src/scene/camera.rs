//! Camera component.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Projection for a scene camera. A closed set, so a tagged variant rather
/// than a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionKind {
    Perspective {
        /// Vertical field of view in degrees.
        fov_y_deg: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        /// Half-height of the view volume in world units.
        size: f32,
        near: f32,
        far: f32,
    },
}

/// Camera component.
///
/// Pure projection state; the view matrix is the inverse of the owning
/// entity's world transform and is derived at render time. The entity
/// flagged `primary` drives the runtime render path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub projection: ProjectionKind,
    pub aspect: f32,
    /// When set, [`Scene::on_viewport_resize`] leaves `aspect` alone.
    ///
    /// [`Scene::on_viewport_resize`]: crate::scene::Scene::on_viewport_resize
    pub fixed_aspect: bool,
    pub primary: bool,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            projection: ProjectionKind::Perspective { fov_y_deg, near, far },
            aspect,
            fixed_aspect: false,
            primary: false,
        }
    }

    #[must_use]
    pub fn new_orthographic(size: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            projection: ProjectionKind::Orthographic { size, near, far },
            aspect,
            fixed_aspect: false,
            primary: false,
        }
    }

    #[must_use]
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionKind::Perspective { fov_y_deg, near, far } => {
                Mat4::perspective_rh(fov_y_deg.to_radians(), self.aspect, near, far)
            }
            ProjectionKind::Orthographic { size, near, far } => {
                let w = size * self.aspect;
                Mat4::orthographic_rh(-w, w, -size, size, near, far)
            }
        }
    }

    /// Adopts the viewport's aspect ratio unless `fixed_aspect` is set.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if !self.fixed_aspect && width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}
