//! Feature records: map icons, area labels, walls/doors and chunk positions.

use crate::assets::{LookupKind, LookupStats, MapAssets};
use crate::region::{Region, RegionSet};
use crate::render::objects::{draws_diagonal, is_door, is_visible, wall_door_hash};
use crate::types::LocationKind;
use crate::worldmap::WorldMapDefinition;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Icon name used when a sprite has no registered name.
pub const ICON_NOT_FOUND: &str = "IconNotFound";

/// Provider id written into GeoJSON icon properties.
pub const ICON_PROVIDER_ID: i32 = 1;

/// A map icon at a world tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconFeature {
    pub icon: String,
    pub x: i32,
    pub y: i32,
    pub plane: i32,
}

/// GeoJSON form of an icon feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoJsonIcon {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: IconProperties,
    pub geometry: PointGeometry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconProperties {
    #[serde(rename = "providerID")]
    pub provider_id: i32,
    pub icon: String,
    #[serde(rename = "mapID")]
    pub map_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[x, y, plane]`.
    pub coordinates: [i32; 3],
}

impl IconFeature {
    pub fn to_geojson(&self, map_id: i32) -> GeoJsonIcon {
        GeoJsonIcon {
            kind: "Feature".to_string(),
            properties: IconProperties {
                provider_id: ICON_PROVIDER_ID,
                icon: self.icon.clone(),
                map_id,
            },
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: [self.x, self.y, self.plane],
            },
        }
    }
}

/// A named map area at a world tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFeature {
    pub label: String,
    /// `<spriteId>-0`.
    pub icon: String,
    pub x: i32,
    pub y: i32,
    pub plane: i32,
}

/// A wall or door the player can interact with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFeature {
    #[serde(rename = "objectID")]
    pub object_id: i32,
    pub object_name: String,
    pub x: i32,
    pub y: i32,
    pub plane: i32,
    pub rotation: u8,
    #[serde(rename = "type")]
    pub type_code: u8,
    pub wall: bool,
    pub door: bool,
    #[serde(rename = "sceneID")]
    pub scene_id: i32,
}

/// A region exported on a plane, in region coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// All feature records collected for one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapFeatures {
    pub icons: Vec<IconFeature>,
    pub labels: Vec<LabelFeature>,
    pub objects: Vec<ObjectFeature>,
}

/// Walks object placements and produces feature records.
///
/// Locations whose definitions are missing are skipped and counted.
pub struct FeatureExporter<'a> {
    assets: &'a MapAssets,
    stats: &'a LookupStats,
}

impl<'a> FeatureExporter<'a> {
    pub fn new(assets: &'a MapAssets, stats: &'a LookupStats) -> Self {
        Self { assets, stats }
    }

    /// Icons are exported for every plane on plane 0, otherwise only for their own plane.
    fn icon_visible(location_plane: i32, plane: usize) -> bool {
        plane == 0 || location_plane == plane as i32
    }

    pub fn icons(&self, region: &Region, plane: usize) -> Vec<IconFeature> {
        let mut out = Vec::new();
        for location in &region.locations {
            if !Self::icon_visible(location.position.z, plane) {
                continue;
            }
            let Some(object) = self.stats.track(
                LookupKind::Object,
                location.id,
                self.assets.object(location.id),
            ) else {
                continue;
            };
            if object.map_area_id == -1 {
                continue;
            }
            let Some(area) = self.stats.track(
                LookupKind::Area,
                object.map_area_id,
                self.assets.area(object.map_area_id),
            ) else {
                continue;
            };
            if self
                .stats
                .track(LookupKind::Sprite, area.sprite_id, self.assets.sprite(area.sprite_id, 0))
                .is_none()
            {
                continue;
            }

            let icon = self
                .assets
                .icon_name(area.sprite_id)
                .unwrap_or(ICON_NOT_FOUND)
                .to_string();
            out.push(IconFeature {
                icon,
                x: location.position.x,
                y: location.position.y,
                plane: plane as i32,
            });
        }
        out
    }

    pub fn labels(&self, region: &Region, plane: usize) -> Vec<LabelFeature> {
        let mut out = Vec::new();
        for location in &region.locations {
            if !Self::icon_visible(location.position.z, plane) {
                continue;
            }
            let Some(object) = self.stats.track(
                LookupKind::Object,
                location.id,
                self.assets.object(location.id),
            ) else {
                continue;
            };
            if object.map_area_id == -1 {
                continue;
            }
            let Some(area) = self.stats.track(
                LookupKind::Area,
                object.map_area_id,
                self.assets.area(object.map_area_id),
            ) else {
                continue;
            };
            let Some(name) = area.name.as_ref() else {
                continue;
            };
            out.push(LabelFeature {
                label: name.clone(),
                icon: format!("{}-0", area.sprite_id),
                x: location.position.x,
                y: location.position.y,
                plane: plane as i32,
            });
        }
        out
    }

    /// Walls and doors visible on a plane; objects with a map-scene are left out.
    pub fn objects(&self, region: &Region, plane: usize) -> Vec<ObjectFeature> {
        let mut out = Vec::new();
        for location in &region.locations {
            let kind = location.kind();
            if !matches!(kind, LocationKind::Wall(_) | LocationKind::DiagonalWall) {
                continue;
            }
            if !is_visible(region, location, plane) {
                continue;
            }
            let Some(object) = self.stats.track(
                LookupKind::Object,
                location.id,
                self.assets.object(location.id),
            ) else {
                continue;
            };
            if object.map_scene_id != -1 {
                continue;
            }

            let local_x = location.position.x - region.base_x();
            let local_y = location.position.y - region.base_y();
            let hash = wall_door_hash(local_x, local_y, location.id, object.wall_or_door);
            if kind == LocationKind::DiagonalWall && !draws_diagonal(hash) {
                continue;
            }

            let door = is_door(hash);
            out.push(ObjectFeature {
                object_id: object.id,
                object_name: object.name.clone(),
                x: location.position.x,
                y: location.position.y,
                plane: plane as i32,
                rotation: location.orientation & 3,
                type_code: location.type_code,
                wall: !door,
                door,
                scene_id: object.map_scene_id,
            });
        }
        out
    }

    /// Collect every feature kind over a set of regions and planes.
    ///
    /// With a map definition, only regions the map contains are visited.
    pub fn collect(
        &self,
        regions: &RegionSet,
        map: Option<&WorldMapDefinition>,
        planes: RangeInclusive<usize>,
    ) -> MapFeatures {
        let mut features = MapFeatures::default();
        for plane in planes {
            for coord in regions.coords_sorted() {
                if let Some(map) = map {
                    if !map.contains(coord.x, coord.y, plane as i32) {
                        continue;
                    }
                }
                let Some(region) = regions.get(coord) else {
                    continue;
                };
                features.icons.extend(self.icons(region, plane));
                features.labels.extend(self.labels(region, plane));
                features.objects.extend(self.objects(region, plane));
            }
        }
        log::info!(
            "Collected {} icons, {} labels, {} objects",
            features.icons.len(),
            features.labels.len(),
            features.objects.len()
        );
        features
    }
}
