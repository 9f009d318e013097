//! Decoded definition tables and map dump loading.
//!
//! The archive decoders that produce these records are external; this module
//! holds their output as immutable lookup tables and loads it from a dump
//! (ZIP file or directory) of JSON records and PNG sprites.

pub mod loader;
pub mod sprite;
pub mod stats;

pub use sprite::SpriteData;
pub use stats::{LookupKind, LookupStats, LookupSummary};

use crate::error::{MapError, Result};
use crate::region::RegionSet;
use crate::worldmap::WorldMapDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flat overlay colour reserved to mean "do not draw".
pub const TRANSPARENT_OVERLAY_RGB: i32 = 0xFF00FF;

fn none() -> i32 {
    -1
}

/// Base terrain palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlayDefinition {
    pub id: i32,
    /// Hue weighted by the hue multiplier.
    pub hue: i32,
    pub saturation: i32,
    pub lightness: i32,
    pub hue_multiplier: i32,
    #[serde(default)]
    pub rgb: i32,
}

impl UnderlayDefinition {
    /// The hue this underlay contributes on its own, on the 0-255 scale.
    pub fn effective_hue(&self) -> i32 {
        if self.hue_multiplier == 0 {
            0
        } else {
            self.hue * 256 / self.hue_multiplier
        }
    }
}

/// Shaped terrain palette entry drawn on top of the underlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDefinition {
    pub id: i32,
    #[serde(default)]
    pub rgb: i32,
    /// Texture id, -1 if none.
    #[serde(default = "none")]
    pub texture: i32,
    #[serde(default)]
    pub hue: i32,
    #[serde(default)]
    pub saturation: i32,
    #[serde(default)]
    pub lightness: i32,
    /// Secondary flat colour, -1 if none.
    #[serde(default = "none")]
    pub secondary_rgb: i32,
    #[serde(default)]
    pub other_hue: i32,
    #[serde(default)]
    pub other_saturation: i32,
    #[serde(default)]
    pub other_lightness: i32,
}

impl OverlayDefinition {
    pub fn has_texture(&self) -> bool {
        self.texture >= 0
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary_rgb != -1
    }

    pub fn is_transparent(&self) -> bool {
        self.rgb == TRANSPARENT_OVERLAY_RGB
    }
}

/// Placed-object definition, reduced to what the map needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    pub id: i32,
    #[serde(default = "default_object_name")]
    pub name: String,
    /// Map area (icon/label) reference, -1 if none.
    #[serde(default = "none")]
    pub map_area_id: i32,
    /// Map-scene sprite frame, -1 if none.
    #[serde(default = "none")]
    pub map_scene_id: i32,
    /// Wall/door discriminant; 0 flips the wall/door hash.
    #[serde(default = "none")]
    pub wall_or_door: i32,
}

fn default_object_name() -> String {
    "null".to_string()
}

/// Map area: an icon sprite and optional label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDefinition {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    pub sprite_id: i32,
}

/// Average colour of a texture, packed HSL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureColor {
    pub id: i32,
    pub average_hsl: i32,
}

/// Mapping from icon sprite id to a human-readable icon name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconName {
    pub id: i32,
    pub name: String,
}

/// All decoded definition tables.
#[derive(Debug, Default, Clone)]
pub struct MapAssets {
    pub underlays: HashMap<i32, UnderlayDefinition>,
    pub overlays: HashMap<i32, OverlayDefinition>,
    pub objects: HashMap<i32, ObjectDefinition>,
    pub areas: HashMap<i32, AreaDefinition>,
    /// Texture id to average packed HSL.
    pub texture_colors: HashMap<i32, i32>,
    /// Sprites by (id, frame).
    pub sprites: HashMap<(i32, i32), SpriteData>,
    /// Map-scene sprites by frame.
    pub map_scenes: HashMap<i32, SpriteData>,
    /// Icon names by sprite id.
    pub icon_names: HashMap<i32, String>,
}

impl MapAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an underlay by 0-based id.
    pub fn underlay(&self, id: i32) -> Option<&UnderlayDefinition> {
        self.underlays.get(&id)
    }

    /// Get an overlay by 0-based id.
    pub fn overlay(&self, id: i32) -> Option<&OverlayDefinition> {
        self.overlays.get(&id)
    }

    pub fn object(&self, id: i32) -> Option<&ObjectDefinition> {
        self.objects.get(&id)
    }

    pub fn area(&self, id: i32) -> Option<&AreaDefinition> {
        self.areas.get(&id)
    }

    pub fn sprite(&self, id: i32, frame: i32) -> Option<&SpriteData> {
        self.sprites.get(&(id, frame))
    }

    pub fn map_scene(&self, id: i32) -> Option<&SpriteData> {
        self.map_scenes.get(&id)
    }

    /// Average packed HSL colour of a texture.
    pub fn texture_color(&self, id: i32) -> Option<i32> {
        self.texture_colors.get(&id).copied()
    }

    pub fn icon_name(&self, sprite_id: i32) -> Option<&str> {
        self.icon_names.get(&sprite_id).map(|s| s.as_str())
    }

    /// Get an object definition, failing when it is absent.
    pub fn require_object(&self, id: i32) -> Result<&ObjectDefinition> {
        self.object(id)
            .ok_or(MapError::DefinitionNotFound { kind: "object", id })
    }

    /// Get an area definition, failing when it is absent.
    pub fn require_area(&self, id: i32) -> Result<&AreaDefinition> {
        self.area(id).ok_or(MapError::DefinitionNotFound { kind: "area", id })
    }

    pub fn add_underlay(&mut self, def: UnderlayDefinition) {
        self.underlays.insert(def.id, def);
    }

    pub fn add_overlay(&mut self, def: OverlayDefinition) {
        self.overlays.insert(def.id, def);
    }

    pub fn add_object(&mut self, def: ObjectDefinition) {
        self.objects.insert(def.id, def);
    }

    pub fn add_area(&mut self, def: AreaDefinition) {
        self.areas.insert(def.id, def);
    }

    pub fn add_sprite(&mut self, id: i32, frame: i32, sprite: SpriteData) {
        self.sprites.insert((id, frame), sprite);
    }

    pub fn add_map_scene(&mut self, frame: i32, sprite: SpriteData) {
        self.map_scenes.insert(frame, sprite);
    }

    /// Get the total number of definitions across all tables.
    pub fn definition_count(&self) -> usize {
        self.underlays.len() + self.overlays.len() + self.objects.len() + self.areas.len()
    }
}

/// Everything loaded from one map dump.
#[derive(Debug, Default, Clone)]
pub struct MapData {
    pub assets: MapAssets,
    pub regions: RegionSet,
    pub world_maps: Vec<WorldMapDefinition>,
}

impl MapData {
    /// Get a world map definition by its id.
    pub fn world_map(&self, id: i32) -> Option<&WorldMapDefinition> {
        self.world_maps.iter().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_hue() {
        let def = UnderlayDefinition {
            id: 0,
            hue: 120 * 40 / 256,
            saturation: 0,
            lightness: 0,
            hue_multiplier: 40,
            rgb: 0,
        };
        assert_eq!(def.effective_hue(), def.hue * 256 / 40);

        let flat = UnderlayDefinition { hue_multiplier: 0, ..def };
        assert_eq!(flat.effective_hue(), 0);
    }

    #[test]
    fn test_overlay_defaults() {
        let def: OverlayDefinition = serde_json::from_str(r#"{"id": 3, "rgb": 16711935}"#).unwrap();
        assert!(!def.has_texture());
        assert!(!def.has_secondary());
        assert!(def.is_transparent());
    }

    #[test]
    fn test_object_defaults() {
        let def: ObjectDefinition = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(def.name, "null");
        assert_eq!(def.map_area_id, -1);
        assert_eq!(def.map_scene_id, -1);
        assert_eq!(def.wall_or_door, -1);
    }

    #[test]
    fn test_lookups() {
        let mut assets = MapAssets::new();
        assets.add_area(AreaDefinition {
            id: 5,
            name: Some("Bank".to_string()),
            sprite_id: 1452,
        });
        assets.icon_names.insert(1452, "bank".to_string());
        assets.add_sprite(1452, 0, SpriteData::new(1, 1, vec![0xFFFFFFFF]).unwrap());

        assert_eq!(assets.area(5).map(|a| a.sprite_id), Some(1452));
        assert_eq!(assets.icon_name(1452), Some("bank"));
        assert!(assets.sprite(1452, 0).is_some());
        assert!(assets.sprite(1452, 1).is_none());
        assert!(assets.underlay(0).is_none());
        assert!(assets.require_area(5).is_ok());
        assert!(matches!(
            assets.require_object(9),
            Err(MapError::DefinitionNotFound { kind: "object", id: 9 })
        ));
    }
}
