//! Pixel buffers that regions are drawn into.

use crate::assets::sprite::argb_to_rgba;
use crate::assets::SpriteData;
use crate::error::{MapError, Result};
use image::{ImageEncoder, RgbaImage};

/// A 2-D buffer of packed ARGB pixels.
///
/// An opaque canvas starts black and forces full alpha on every write; a
/// transparent canvas starts fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    opaque: bool,
    pixels: Vec<u32>,
}

impl Canvas {
    /// Create a fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            opaque: false,
            pixels: vec![0; (width as usize) * (height as usize)],
        }
    }

    /// Create an opaque canvas with a black background.
    pub fn opaque(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            opaque: true,
            pixels: vec![0xFF000000; (width as usize) * (height as usize)],
        }
    }

    /// Create a canvas of the given kind.
    pub fn with_background(width: u32, height: u32, transparent: bool) -> Self {
        if transparent {
            Self::new(width, height)
        } else {
            Self::opaque(width, height)
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + x as usize)
    }

    /// Get a pixel, or 0 outside the canvas.
    pub fn get(&self, x: i64, y: i64) -> u32 {
        self.index(x, y).map(|i| self.pixels[i]).unwrap_or(0)
    }

    /// Overwrite a pixel. Writes outside the canvas are ignored.
    pub fn set(&mut self, x: i64, y: i64, argb: u32) {
        let opaque = self.opaque;
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = if opaque { argb | 0xFF000000 } else { argb };
        }
    }

    /// Composite a pixel over the existing one (source-over).
    pub fn blend(&mut self, x: i64, y: i64, argb: u32) {
        let opaque = self.opaque;
        if let Some(i) = self.index(x, y) {
            let out = blend_over(self.pixels[i], argb);
            self.pixels[i] = if opaque { out | 0xFF000000 } else { out };
        }
    }

    /// Fill a rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, argb: u32) {
        for dy in 0..height as i64 {
            for dx in 0..width as i64 {
                self.set(x + dx, y + dy, argb);
            }
        }
    }

    /// Draw a sprite with its top-left corner at (x, y).
    pub fn draw_sprite(&mut self, sprite: &SpriteData, x: i64, y: i64) {
        for sy in 0..sprite.height {
            for sx in 0..sprite.width {
                let argb = sprite.get_pixel(sx, sy);
                if argb >> 24 != 0 {
                    self.blend(x + sx as i64, y + sy as i64, argb);
                }
            }
        }
    }

    /// Draw another canvas over this one with its top-left corner at (x, y).
    ///
    /// Fully transparent source pixels leave the destination untouched.
    pub fn draw_canvas(&mut self, other: &Canvas, x: i64, y: i64) {
        for oy in 0..other.height as i64 {
            for ox in 0..other.width as i64 {
                let argb = other.get(ox, oy);
                if argb >> 24 != 0 {
                    self.blend(x + ox, y + oy, argb);
                }
            }
        }
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

    /// Encode the canvas as PNG bytes; opaque canvases are written as RGB.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(MapError::Export("cannot encode an empty canvas".to_string()));
        }

        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        let (raw, color_type) = if self.opaque {
            let rgb: Vec<u8> = self
                .pixels
                .iter()
                .flat_map(|&p| [(p >> 16) as u8, (p >> 8) as u8, p as u8])
                .collect();
            (rgb, image::ExtendedColorType::Rgb8)
        } else {
            (self.to_rgba_image().into_raw(), image::ExtendedColorType::Rgba8)
        };

        encoder
            .write_image(&raw, self.width, self.height, color_type)
            .map_err(|e| MapError::Export(format!("Failed to encode PNG: {}", e)))?;

        Ok(bytes)
    }
}

/// Source-over compositing of two ARGB pixels.
pub fn blend_over(dst: u32, src: u32) -> u32 {
    let sa = src >> 24;
    if sa == 0xFF {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = dst >> 24;
    let inv = 255 - sa;
    let out_a = sa + da * inv / 255;
    if out_a == 0 {
        return 0;
    }
    let channel = |shift: u32| {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        ((s * sa + d * da * inv / 255) / out_a).min(255)
    };
    out_a << 24 | channel(16) << 16 | channel(8) << 8 | channel(0)
}
