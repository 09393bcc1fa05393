//! Material boundary object: shading parameters plus texture maps.

use std::borrow::Cow;
use std::sync::Arc;

use bitflags::bitflags;
use glam::{Vec3, Vec4};
use uuid::Uuid;

use crate::resources::shader::Shader;
use crate::resources::texture::Texture;

bitflags! {
    /// Which texture maps a material carries. Drives which sampler slots
    /// the renderer binds for a draw.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFlags: u32 {
        const ALBEDO_MAP    = 1 << 0;
        const NORMAL_MAP    = 1 << 1;
        const METALLIC_MAP  = 1 << 2;
        const ROUGHNESS_MAP = 1 << 3;
        const AO_MAP        = 1 << 4;
        const EMISSIVE_MAP  = 1 << 5;
    }
}

/// Uniform and sampler names for one texture slot, in slot order.
pub(crate) struct MapBinding {
    pub flag: MaterialFlags,
    pub sampler: &'static str,
    pub toggle: &'static str,
    pub slot: u32,
}

pub(crate) const MAP_BINDINGS: [MapBinding; 6] = [
    MapBinding {
        flag: MaterialFlags::ALBEDO_MAP,
        sampler: "u_AlbedoMap",
        toggle: "u_UseAlbedoMap",
        slot: 0,
    },
    MapBinding {
        flag: MaterialFlags::NORMAL_MAP,
        sampler: "u_NormalMap",
        toggle: "u_UseNormalMap",
        slot: 1,
    },
    MapBinding {
        flag: MaterialFlags::METALLIC_MAP,
        sampler: "u_MetallicMap",
        toggle: "u_UseMetallicMap",
        slot: 2,
    },
    MapBinding {
        flag: MaterialFlags::ROUGHNESS_MAP,
        sampler: "u_RoughnessMap",
        toggle: "u_UseRoughnessMap",
        slot: 3,
    },
    MapBinding {
        flag: MaterialFlags::AO_MAP,
        sampler: "u_AoMap",
        toggle: "u_UseAoMap",
        slot: 4,
    },
    MapBinding {
        flag: MaterialFlags::EMISSIVE_MAP,
        sampler: "u_EmissiveMap",
        toggle: "u_UseEmissiveMap",
        slot: 5,
    },
];

/// Material boundary object.
///
/// Color factors plus up to six optional texture maps. Shared between
/// entities via `Arc`; the renderer treats it as immutable while a frame is
/// in flight.
#[derive(Debug)]
pub struct Material {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,
    pub(crate) shader: Arc<Shader>,

    pub base_color: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: Vec3,

    pub albedo_map: Option<Arc<Texture>>,
    pub normal_map: Option<Arc<Texture>>,
    pub metallic_map: Option<Arc<Texture>>,
    pub roughness_map: Option<Arc<Texture>>,
    pub ao_map: Option<Arc<Texture>>,
    pub emissive_map: Option<Arc<Texture>>,
}

impl Material {
    #[must_use]
    pub fn new(shader: Arc<Shader>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            shader,
            base_color: Vec4::ONE,
            metallic: 0.0,
            roughness: 0.8,
            emissive: Vec3::ZERO,
            albedo_map: None,
            normal_map: None,
            metallic_map: None,
            roughness_map: None,
            ao_map: None,
            emissive_map: None,
        }
    }

    #[must_use]
    pub fn shader(&self) -> &Arc<Shader> {
        &self.shader
    }

    /// Flags derived from which maps are present.
    #[must_use]
    pub fn flags(&self) -> MaterialFlags {
        let mut flags = MaterialFlags::empty();
        for binding in &MAP_BINDINGS {
            if self.map_for(binding.flag).is_some() {
                flags |= binding.flag;
            }
        }
        flags
    }

    pub(crate) fn map_for(&self, flag: MaterialFlags) -> Option<&Arc<Texture>> {
        match flag {
            MaterialFlags::ALBEDO_MAP => self.albedo_map.as_ref(),
            MaterialFlags::NORMAL_MAP => self.normal_map.as_ref(),
            MaterialFlags::METALLIC_MAP => self.metallic_map.as_ref(),
            MaterialFlags::ROUGHNESS_MAP => self.roughness_map.as_ref(),
            MaterialFlags::AO_MAP => self.ao_map.as_ref(),
            MaterialFlags::EMISSIVE_MAP => self.emissive_map.as_ref(),
            _ => None,
        }
    }
}
