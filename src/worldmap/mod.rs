//! World-map groupings: which regions belong to a map and where they are drawn.
//!
//! A world map lists membership rules in order. The first rule that matches a
//! region decides whether the region belongs to the map; where it is drawn
//! is decided by the remap rules alone.

use crate::types::{Position, REGION_SIZE};
use serde::{Deserialize, Serialize};

/// Tiles of padding added around a map's bounds.
pub const BOUNDS_MARGIN: i32 = 100;

/// One region-membership rule. Coordinates are in region units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionRule {
    /// A single region on one plane.
    Point { plane: i32, x_low: i32, y_low: i32 },
    /// An inclusive rectangle of regions on any plane.
    Rect {
        x_low: i32,
        y_low: i32,
        x_high: i32,
        y_high: i32,
    },
    /// A single region on one plane, with a display extent for bounds.
    AltPoint {
        plane: i32,
        x_low: i32,
        y_low: i32,
        x_high: i32,
        y_high: i32,
    },
    /// A single region drawn at another position on plane 0.
    Remap {
        old_plane: i32,
        old_x: i32,
        old_y: i32,
        new_x: i32,
        new_y: i32,
    },
}

impl RegionRule {
    /// Whether the rule matches region (x, y) on plane z.
    pub fn matches(&self, x: i32, y: i32, z: i32) -> bool {
        match *self {
            RegionRule::Point { plane, x_low, y_low }
            | RegionRule::AltPoint {
                plane, x_low, y_low, ..
            } => x == x_low && y == y_low && z == plane,
            RegionRule::Rect {
                x_low,
                y_low,
                x_high,
                y_high,
            } => (x_low..=x_high).contains(&x) && (y_low..=y_high).contains(&y),
            RegionRule::Remap { old_x, old_y, .. } => x == old_x && y == old_y,
        }
    }

    /// Region-unit extent this rule contributes to the map bounds: (min, max) corners.
    pub fn extent(&self) -> ((i32, i32), (i32, i32)) {
        match *self {
            RegionRule::Point { x_low, y_low, .. } => ((x_low, y_low), (x_low, y_low)),
            RegionRule::Rect {
                x_low,
                y_low,
                x_high,
                y_high,
            }
            | RegionRule::AltPoint {
                x_low,
                y_low,
                x_high,
                y_high,
                ..
            } => ((x_low, y_low), (x_high, y_high)),
            RegionRule::Remap { new_x, new_y, .. } => ((new_x, new_y), (new_x, new_y)),
        }
    }
}

fn default_zoom() -> i32 {
    1
}

/// A named world-map grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMapDefinition {
    /// Map id, used as the file-name prefix of exported tiles.
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub safe_name: String,
    /// Centre of the map in world tiles.
    pub position: Position,
    #[serde(default)]
    pub is_surface: bool,
    #[serde(default = "default_zoom")]
    pub default_zoom: i32,
    #[serde(default)]
    pub rules: Vec<RegionRule>,
}

/// Map bounds in world tiles: `[[min_x, min_y], [max_x, max_y]]`.
pub type MapBounds = [[i32; 2]; 2];

/// Descriptor of one map for the web viewer's base-map list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMapEntry {
    pub map_id: i32,
    pub cache_version: String,
    pub name: String,
    pub center: [i32; 2],
    pub bounds: MapBounds,
    pub zoom_limits: [i32; 2],
    pub default_zoom: i32,
    pub max_native_zoom: i32,
}

impl WorldMapDefinition {
    pub fn new(id: i32, name: impl Into<String>, position: Position) -> Self {
        let name = name.into();
        Self {
            id,
            safe_name: name.to_lowercase().replace(' ', "_"),
            name,
            position,
            is_surface: false,
            default_zoom: default_zoom(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: RegionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// First rule matching region (x, y) on plane z.
    pub fn matching_rule(&self, x: i32, y: i32, z: i32) -> Option<&RegionRule> {
        self.rules.iter().find(|rule| rule.matches(x, y, z))
    }

    /// Whether region (x, y) on plane z belongs to this map.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.matching_rule(x, y, z).is_some()
    }

    /// Where region (x, y) on plane z is drawn.
    ///
    /// The first remap rule for exactly (x, y, z) moves the region to its
    /// new position on plane 0; other rules never move it.
    pub fn remap(&self, x: i32, y: i32, z: i32) -> Position {
        self.rules
            .iter()
            .find_map(|rule| match *rule {
                RegionRule::Remap {
                    old_plane,
                    old_x,
                    old_y,
                    new_x,
                    new_y,
                } if old_x == x && old_y == y && old_plane == z => Some(Position::new(new_x, new_y, 0)),
                _ => None,
            })
            .unwrap_or(Position::new(x, y, z))
    }

    /// Bounds of the map in world tiles, padded by [`BOUNDS_MARGIN`].
    pub fn bounds(&self) -> MapBounds {
        let cx = self.position.x / REGION_SIZE;
        let cy = self.position.y / REGION_SIZE;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (cx, cy, cx, cy);

        for rule in &self.rules {
            let ((lx, ly), (hx, hy)) = rule.extent();
            min_x = min_x.min(lx);
            min_y = min_y.min(ly);
            max_x = max_x.max(hx);
            max_y = max_y.max(hy);
        }

        [
            [min_x * REGION_SIZE - BOUNDS_MARGIN, min_y * REGION_SIZE - BOUNDS_MARGIN],
            [max_x * REGION_SIZE + BOUNDS_MARGIN, max_y * REGION_SIZE + BOUNDS_MARGIN],
        ]
    }

    /// Base-map descriptor for this map.
    pub fn base_map_entry(&self, cache_version: &str) -> BaseMapEntry {
        BaseMapEntry {
            map_id: self.id,
            cache_version: cache_version.to_string(),
            name: self.name.clone(),
            center: [self.position.x, self.position.y],
            bounds: self.bounds(),
            zoom_limits: [-3, 5],
            default_zoom: 1,
            max_native_zoom: 3,
        }
    }
}
