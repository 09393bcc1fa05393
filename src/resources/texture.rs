//! Texture boundary object.

use std::sync::Arc;

use uuid::Uuid;

use crate::errors::Result;
use crate::render::device::{RenderDevice, TextureId};

/// An RGBA8 image uploaded to the render device, shared by materials.
/// Immutable once created; the renderer only binds it to sampler slots.
#[derive(Debug)]
pub struct Texture {
    pub uuid: Uuid,
    pub width: u32,
    pub height: u32,
    pub(crate) id: TextureId,
}

impl Texture {
    /// Uploads tightly packed RGBA8 pixels (`width * height * 4` bytes).
    pub fn from_pixels(
        device: &mut dyn RenderDevice,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Arc<Self>> {
        let id = device.create_texture(width, height, pixels)?;
        Ok(Arc::new(Self {
            uuid: Uuid::new_v4(),
            width,
            height,
            id,
        }))
    }

    /// 1×1 opaque white. The renderer's fallback for missing maps.
    pub fn white(device: &mut dyn RenderDevice) -> Result<Arc<Self>> {
        Self::from_pixels(device, 1, 1, &[255, 255, 255, 255])
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> TextureId {
        self.id
    }
}
