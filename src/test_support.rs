//! Shared fixtures for unit tests.

use crate::assets::{MapAssets, ObjectDefinition, OverlayDefinition, SpriteData, UnderlayDefinition};
use crate::region::Region;
use crate::shapes::TileShapes;
use crate::types::RegionCoord;

/// Thirteen procedural 32×32 masks, row-major.
///
/// Shape 0 is empty, shape 1 is full and shape 7 is the left half.
pub fn canonical_masks() -> Vec<Vec<bool>> {
    let predicates: [fn(i32, i32) -> bool; 13] = [
        |_, _| false,
        |_, _| true,
        |x, y| x + y < 32,
        |x, y| x + y < 16,
        |x, y| x + y < 48,
        |x, y| x < y,
        |_, y| y < 16,
        |x, _| x < 16,
        |x, y| x * x + y * y < 32 * 32,
        |x, y| x * x + y * y < 16 * 16,
        |x, y| (31 - x) * (31 - x) + (31 - y) * (31 - y) >= 32 * 32,
        |x, _| x < 8,
        |x, y| x < 24 && y < 24,
    ];
    predicates
        .iter()
        .map(|covered| {
            (0..32 * 32)
                .map(|i| covered(i % 32, i / 32))
                .collect()
        })
        .collect()
}

pub fn test_shapes() -> TileShapes {
    TileShapes::from_masks(&canonical_masks()).unwrap()
}

pub fn underlay(id: i32, hue: i32, saturation: i32, lightness: i32) -> UnderlayDefinition {
    UnderlayDefinition {
        id,
        hue: hue * 64 / 256,
        saturation,
        lightness,
        hue_multiplier: 64,
        rgb: 0,
    }
}

pub fn flat_overlay(id: i32, hue: i32, saturation: i32, lightness: i32) -> OverlayDefinition {
    OverlayDefinition {
        id,
        rgb: 0x336699,
        texture: -1,
        hue,
        saturation,
        lightness,
        secondary_rgb: -1,
        other_hue: 0,
        other_saturation: 0,
        other_lightness: 0,
    }
}

/// Assets with four distinct underlays (ids 0-3), overlays for each colour
/// source (0 flat, 1 transparent, 2 textured, 3 secondary colour), a wall, a
/// door and a map-scene object.
pub fn test_assets() -> MapAssets {
    let mut assets = MapAssets::new();
    assets.add_underlay(underlay(0, 40, 120, 60));
    assets.add_underlay(underlay(1, 160, 200, 140));
    assets.add_underlay(underlay(2, 80, 60, 100));
    assets.add_underlay(underlay(3, 220, 240, 30));

    assets.add_overlay(flat_overlay(0, 20, 100, 180));
    assets.add_overlay(OverlayDefinition {
        rgb: 0xFF00FF,
        ..flat_overlay(1, 0, 0, 0)
    });
    assets.add_overlay(OverlayDefinition {
        texture: 5,
        ..flat_overlay(2, 0, 0, 0)
    });
    assets.texture_colors.insert(5, (10 << 10) + (3 << 7) + 70);
    assets.add_overlay(OverlayDefinition {
        secondary_rgb: 0x00FF00,
        other_hue: 100,
        other_saturation: 200,
        other_lightness: 90,
        ..flat_overlay(3, 20, 100, 180)
    });

    assets.add_object(ObjectDefinition {
        id: 1,
        name: "Wall".to_string(),
        map_area_id: -1,
        map_scene_id: -1,
        wall_or_door: 1,
    });
    assets.add_object(ObjectDefinition {
        id: 2,
        name: "Door".to_string(),
        map_area_id: -1,
        map_scene_id: -1,
        wall_or_door: 0,
    });
    assets.add_object(ObjectDefinition {
        id: 3,
        name: "Tree".to_string(),
        map_area_id: -1,
        map_scene_id: 4,
        wall_or_door: -1,
    });
    assets.add_map_scene(4, SpriteData::new(2, 2, vec![0xFF00AA00; 4]).unwrap());
    assets
}

/// A region whose plane is entirely covered by one underlay (1-based id).
pub fn uniform_region(x: i32, y: i32, plane: usize, underlay_id: u16) -> Region {
    let mut region = Region::new(RegionCoord::new(x, y));
    region.fill_underlay(plane, underlay_id);
    region
}
