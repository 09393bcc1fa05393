//! Local TRS state and the cached world matrix.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Transform component.
///
/// Local translation, rotation and scale, plus the cached world matrix the
/// scene tree writes during propagation. Rotation is stored as Euler angles
/// in degrees (XYZ order) so editing tools can round-trip the values the
/// user typed.
///
/// # Update model
///
/// The world matrix is recomputed once per frame by [`SceneTree::update`] in
/// parent-before-child order, never lazily. Reading [`world_matrix`] before
/// the frame's update returns last frame's value; picking-style consumers
/// tolerate that one-frame lag by design.
///
/// [`SceneTree::update`]: crate::scene::SceneTree::update
/// [`world_matrix`]: Transform::world_matrix
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in degrees, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,

    // Matrix caches, written by the scene tree.
    pub(crate) local: Mat4,
    pub(crate) world: Mat4,

    // Shadow state for the dirty check.
    last_position: Vec3,
    last_rotation: Vec3,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,

            local: Mat4::IDENTITY,
            world: Mat4::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Vec3::ZERO,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        let mut t = Self::new();
        t.position = position;
        t
    }

    // ========================================================================
    // Dirty tracking (shadow state check)
    // ========================================================================

    /// Recomputes the cached local matrix if any TRS field changed since the
    /// last call. Returns whether a recompute happened.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local = Mat4::from_scale_rotation_translation(
                self.scale,
                self.rotation_quat(),
                self.position,
            );

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// Forces a local matrix recompute on the next update, even when the TRS
    /// fields compare equal. Reparenting uses this to rebuild the subtree.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }

    // ========================================================================
    // Matrix access
    // ========================================================================

    /// Local matrix composed fresh from position/rotation/scale:
    /// translate × rotate × scale.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }

    /// Cached world matrix from the most recent tree update.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Refreshes the world cache: `world = parent_world * local`.
    ///
    /// Expects the local cache to be current (the tree calls
    /// [`update_local_matrix`] first).
    ///
    /// [`update_local_matrix`]: Transform::update_local_matrix
    pub fn update_world(&mut self, parent_world: &Mat4) {
        self.world = *parent_world * self.local;
    }

    /// Sets position/rotation/scale by decomposing a local matrix, as after
    /// a gizmo drag.
    ///
    /// Decomposition discards skew and perspective, so matrices containing
    /// shear or negative scale do not round-trip exactly. This is a known
    /// approximation of the TRS-only data model, not an error.
    ///
    /// Leaves the transform dirty: the next tree update recomposes the local
    /// matrix from the decomposed TRS and rebuilds the world matrix.
    pub fn set_local_matrix(&mut self, matrix: Mat4) {
        self.local = matrix;

        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();

        self.position = translation;
        self.rotation = quat_to_euler_degrees(rotation);
        self.scale = scale;

        self.last_position = self.position;
        self.last_rotation = self.rotation;
        self.last_scale = self.scale;

        self.mark_dirty();
    }

    // ========================================================================
    // Rotation helpers
    // ========================================================================

    /// Quaternion form of the Euler-degree rotation.
    #[inline]
    #[must_use]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Points -Z at `target`. `target` and `up` are in the parent's space.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize();
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();
        let rot = Quat::from_mat3(&Mat3::from_cols(right, new_up, -forward));
        self.rotation = quat_to_euler_degrees(rot);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

fn quat_to_euler_degrees(q: Quat) -> Vec3 {
    let (x, y, z) = q.to_euler(EulerRot::XYZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}
