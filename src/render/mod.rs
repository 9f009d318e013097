//! Region compositing and world stitching.
//!
//! [`Renderer`] draws one region at one plane into a [`Canvas`]; the
//! [`WorldStitcher`] places many regions on one shared canvas.

pub mod blur;
pub mod canvas;
pub mod compositor;
pub mod objects;
pub mod stitcher;

pub use crate::assets::{LookupKind, LookupStats, LookupSummary};
pub use blur::{compose_floor, floor_blur};
pub use canvas::Canvas;
pub use compositor::Renderer;
pub use stitcher::{stitch_layers, StitchLayout, WorldStitcher};

use crate::assets::MapAssets;
use crate::color::palette::DEFAULT_BRIGHTNESS;
use crate::error::{MapError, Result};
use crate::region::RegionSet;
use crate::shapes::TileShapes;
use serde::{Deserialize, Serialize};

/// Highest zoom layer; layer `n` draws `2^n` pixels per tile.
pub const MAX_LAYER: u32 = 8;

/// Largest supported scale in pixels per tile edge.
pub const MAX_SCALE: u32 = 1 << MAX_LAYER;

/// Pixels per tile edge at a zoom layer.
pub fn layer_scale(layer: u32) -> Result<u32> {
    if layer > MAX_LAYER {
        return Err(MapError::InvalidConfig(format!(
            "zoom layer {} is above the maximum of {}",
            layer, MAX_LAYER
        )));
    }
    Ok(1 << layer)
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pixels per tile edge.
    pub scale: u32,
    /// Radius of the underlay blend window in tiles.
    pub blend_radius: u32,
    /// Palette brightness exponent.
    pub brightness: f64,
    /// Draw walls, doors and map-scene objects.
    pub draw_objects: bool,
    /// Blit map-scene sprites for objects that have one.
    pub draw_map_scenes: bool,
    /// ARGB colour of wall strokes.
    pub wall_color: u32,
    /// ARGB colour of door strokes.
    pub door_color: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 4,
            blend_radius: 5,
            brightness: DEFAULT_BRIGHTNESS,
            draw_objects: true,
            draw_map_scenes: true,
            wall_color: 0xFFEEEEEE,
            door_color: 0xFFEE0000,
        }
    }
}

impl RenderConfig {
    /// Set the scale, clamped to `1..=MAX_SCALE`.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.clamp(1, MAX_SCALE);
        self
    }

    pub fn with_blend_radius(mut self, radius: u32) -> Self {
        self.blend_radius = radius;
        self
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_objects(mut self, draw_objects: bool) -> Self {
        self.draw_objects = draw_objects;
        self
    }

    pub fn with_map_scenes(mut self, draw_map_scenes: bool) -> Self {
        self.draw_map_scenes = draw_map_scenes;
        self
    }

    pub fn with_colors(mut self, wall_color: u32, door_color: u32) -> Self {
        self.wall_color = wall_color;
        self.door_color = door_color;
        self
    }
}

/// The immutable tables a render reads from.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub assets: &'a MapAssets,
    pub regions: &'a RegionSet,
    pub shapes: &'a TileShapes,
}

impl<'a> RenderContext<'a> {
    pub fn new(assets: &'a MapAssets, regions: &'a RegionSet, shapes: &'a TileShapes) -> Self {
        Self {
            assets,
            regions,
            shapes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: RenderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.scale, 4);
        assert_eq!(config.blend_radius, 5);
        assert_eq!(config.wall_color, 0xFFEEEEEE);
    }

    #[test]
    fn test_config_builders() {
        let config = RenderConfig::default()
            .with_scale(0)
            .with_blend_radius(2)
            .with_objects(false)
            .with_colors(1, 2);
        assert_eq!(config.scale, 1);
        assert_eq!(config.blend_radius, 2);
        assert!(!config.draw_objects);
        assert_eq!((config.wall_color, config.door_color), (1, 2));
        assert_eq!(RenderConfig::default().with_scale(1 << 30).scale, MAX_SCALE);
    }

    #[test]
    fn test_layer_scale_bounds() {
        assert_eq!(layer_scale(0).unwrap(), 1);
        assert_eq!(layer_scale(3).unwrap(), 8);
        assert_eq!(layer_scale(MAX_LAYER).unwrap(), MAX_SCALE);
        assert!(matches!(layer_scale(MAX_LAYER + 1), Err(MapError::InvalidConfig(_))));
        assert!(matches!(layer_scale(32), Err(MapError::InvalidConfig(_))));
    }
}
