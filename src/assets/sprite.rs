//! Decoded sprite pixel buffers.

use crate::error::{MapError, Result};
use image::imageops::FilterType;
use image::RgbaImage;

/// A decoded sprite with packed ARGB pixels (alpha in the top byte).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteData {
    /// Sprite width in pixels.
    pub width: u32,
    /// Sprite height in pixels.
    pub height: u32,
    /// ARGB pixel data, row-major.
    pub pixels: Vec<u32>,
}

impl SpriteData {
    /// Create a sprite from ARGB data.
    ///
    /// Fails unless there is exactly one pixel per `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        if pixels.len() as u64 != width as u64 * height as u64 {
            return Err(MapError::InvalidMapData(format!(
                "sprite {}x{} has {} pixels",
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Get a pixel at (x, y); transparent outside the sprite.
    pub fn get_pixel(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels.get(index).copied().unwrap_or(0)
    }

    /// Whether the sprite has any drawable pixel.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Convert to an RGBA image buffer.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let raw = self
            .pixels
            .iter()
            .flat_map(|&p| argb_to_rgba(p))
            .collect::<Vec<u8>>();
        RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Build a sprite from an RGBA image buffer.
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image.pixels().map(|p| rgba_to_argb(p.0)).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Resize with nearest-neighbour sampling.
    pub fn scaled(&self, width: u32, height: u32) -> SpriteData {
        if self.is_empty() || (width == self.width && height == self.height) {
            return self.clone();
        }
        let resized = image::imageops::resize(&self.to_rgba_image(), width, height, FilterType::Nearest);
        Self::from_rgba_image(&resized)
    }
}

/// Load a sprite from PNG bytes.
pub fn load_sprite_from_bytes(data: &[u8]) -> std::result::Result<SpriteData, image::ImageError> {
    let img = image::load_from_memory(data)?;
    Ok(SpriteData::from_rgba_image(&img.to_rgba8()))
}

/// Split packed ARGB into RGBA bytes.
pub fn argb_to_rgba(argb: u32) -> [u8; 4] {
    [
        (argb >> 16) as u8,
        (argb >> 8) as u8,
        argb as u8,
        (argb >> 24) as u8,
    ]
}

/// Pack RGBA bytes into ARGB.
pub fn rgba_to_argb(rgba: [u8; 4]) -> u32 {
    (rgba[3] as u32) << 24 | (rgba[0] as u32) << 16 | (rgba[1] as u32) << 8 | rgba[2] as u32
}
