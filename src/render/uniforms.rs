//! GPU uniform block layouts.
//!
//! Every struct here is `#[repr(C)]` and padded by hand to std140 rules;
//! the tests at the bottom pin the sizes so a stray field edit cannot
//! silently shear the GPU-side view of the data.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Uniform block binding index of [`CameraUniforms`].
pub const CAMERA_BINDING: u32 = 0;
/// Uniform block binding index of [`LightBlock`].
pub const LIGHT_BINDING: u32 = 1;
/// Hard cap on lights uploaded per frame.
pub const MAX_LIGHTS: usize = 32;

/// Per-frame camera block, uploaded once in `begin_scene`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    /// Camera world position, `w` unused.
    pub position: Vec4,
}

impl CameraUniforms {
    #[must_use]
    pub fn new(view: &Mat4, projection: &Mat4) -> Self {
        Self {
            view: *view,
            projection: *projection,
            view_projection: *projection * *view,
            position: view.inverse().w_axis,
        }
    }
}

/// One packed light. Rows are 16 bytes each so the array strides cleanly
/// under std140.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct GpuLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub range: f32,
    pub direction: Vec3,
    /// 0 directional, 1 point, 2 spot.
    pub light_type: u32,
    pub inner_cone_cos: f32,
    pub outer_cone_cos: f32,
    pub _padding: [u32; 2],
}

/// Fixed-size light array block, uploaded once in `begin_scene`.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LightBlock {
    pub lights: [GpuLight; MAX_LIGHTS],
    pub count: u32,
    pub _padding: [u32; 3],
}

impl Default for LightBlock {
    fn default() -> Self {
        Self::zeroed()
    }
}

// =============================================================================
// Tests
// =============================================================================
