//! Light component.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Light variant and its per-kind parameters. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    Directional,
    Point {
        range: f32,
    },
    Spot {
        range: f32,
        inner_deg: f32,
        outer_deg: f32,
    },
}

/// Light component.
///
/// Direction (for directional and spot lights) is the owning entity's world
/// -Z axis; position comes from the world transform. The renderer consumes
/// at most 32 lights per frame; extras are dropped with a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional,
        }
    }

    #[must_use]
    pub fn point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point { range },
        }
    }

    #[must_use]
    pub fn spot(color: Vec3, intensity: f32, range: f32, inner_deg: f32, outer_deg: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Spot {
                range,
                inner_deg,
                outer_deg,
            },
        }
    }
}
