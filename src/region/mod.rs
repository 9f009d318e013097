//! Decoded region grids.
//!
//! A region is a 64×64 tile chunk of the world with four planes of terrain
//! data and the list of objects placed in it. Regions are immutable once
//! loaded and are looked up either by region coordinates or by world tile
//! coordinates through a [`RegionSet`].

use crate::error::{MapError, Result};
use crate::types::{Location, RegionCoord, PLANES, REGION_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of tiles in one plane of a region.
pub const TILES_PER_PLANE: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// Settings bit marking a bridge tile (read from plane 1).
pub const SETTING_BRIDGE: u8 = 0x2;

/// Settings bits marking a tile as blocked or void on its own plane.
pub const SETTING_HIDDEN: u8 = 0x8 | 0x10;

/// Terrain data for one plane of a region.
///
/// Arrays are indexed `x + 64 * y` in region-local tile coordinates. An empty
/// array in a dump stands for "all zero".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneTiles {
    /// Underlay ids, 0 = none, otherwise 1-based.
    #[serde(default)]
    pub underlays: Vec<u16>,
    /// Overlay ids, 0 = none, otherwise 1-based.
    #[serde(default)]
    pub overlays: Vec<u16>,
    /// Overlay path (shape id minus one) per tile.
    #[serde(default)]
    pub overlay_paths: Vec<u8>,
    /// Overlay rotation (0-3) per tile.
    #[serde(default)]
    pub overlay_rotations: Vec<u8>,
    /// Settings bitmask per tile.
    #[serde(default)]
    pub settings: Vec<u8>,
}

impl PlaneTiles {
    fn zeroed() -> Self {
        Self {
            underlays: vec![0; TILES_PER_PLANE],
            overlays: vec![0; TILES_PER_PLANE],
            overlay_paths: vec![0; TILES_PER_PLANE],
            overlay_rotations: vec![0; TILES_PER_PLANE],
            settings: vec![0; TILES_PER_PLANE],
        }
    }

    fn normalize(&mut self, coord: RegionCoord, plane: usize) -> Result<()> {
        fill_or_check(&mut self.underlays, "underlays", coord, plane)?;
        fill_or_check(&mut self.overlays, "overlays", coord, plane)?;
        fill_or_check(&mut self.overlay_paths, "overlay_paths", coord, plane)?;
        fill_or_check(&mut self.overlay_rotations, "overlay_rotations", coord, plane)?;
        fill_or_check(&mut self.settings, "settings", coord, plane)?;
        Ok(())
    }
}

fn fill_or_check<T: Copy + Default>(
    values: &mut Vec<T>,
    name: &str,
    coord: RegionCoord,
    plane: usize,
) -> Result<()> {
    if values.is_empty() {
        values.resize(TILES_PER_PLANE, T::default());
        return Ok(());
    }
    if values.len() != TILES_PER_PLANE {
        return Err(MapError::InvalidRegion(format!(
            "region ({}, {}) plane {}: {} has {} entries, expected {}",
            coord.x,
            coord.y,
            plane,
            name,
            values.len(),
            TILES_PER_PLANE
        )));
    }
    Ok(())
}

/// A decoded 64×64 region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region grid coordinates.
    #[serde(flatten)]
    pub coord: RegionCoord,
    /// Per-plane terrain; always four planes after [`Region::normalize`].
    #[serde(default)]
    pub planes: Vec<PlaneTiles>,
    /// Objects placed in this region.
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl Region {
    /// Create an empty region (no terrain, no objects).
    pub fn new(coord: RegionCoord) -> Self {
        Self {
            coord,
            planes: (0..PLANES).map(|_| PlaneTiles::zeroed()).collect(),
            locations: Vec::new(),
        }
    }

    /// Parse a region from its JSON dump and normalize it.
    pub fn from_json(contents: &str) -> Result<Self> {
        let mut region: Region = serde_json::from_str(contents)?;
        region.normalize()?;
        Ok(region)
    }

    /// Pad missing planes and arrays, and reject arrays of the wrong length.
    pub fn normalize(&mut self) -> Result<()> {
        if self.planes.len() > PLANES {
            return Err(MapError::InvalidRegion(format!(
                "region ({}, {}) has {} planes",
                self.coord.x,
                self.coord.y,
                self.planes.len()
            )));
        }
        self.planes.resize_with(PLANES, PlaneTiles::default);
        for (plane, tiles) in self.planes.iter_mut().enumerate() {
            tiles.normalize(self.coord, plane)?;
        }
        Ok(())
    }

    /// World x coordinate of the south-west tile.
    pub fn base_x(&self) -> i32 {
        self.coord.base_x()
    }

    /// World y coordinate of the south-west tile.
    pub fn base_y(&self) -> i32 {
        self.coord.base_y()
    }

    fn index(plane: usize, x: i32, y: i32) -> Option<(usize, usize)> {
        if plane >= PLANES || !(0..REGION_SIZE).contains(&x) || !(0..REGION_SIZE).contains(&y) {
            return None;
        }
        Some((plane, (x + y * REGION_SIZE) as usize))
    }

    pub fn underlay_id(&self, plane: usize, x: i32, y: i32) -> u16 {
        Self::index(plane, x, y)
            .map(|(p, i)| self.planes[p].underlays[i])
            .unwrap_or(0)
    }

    pub fn overlay_id(&self, plane: usize, x: i32, y: i32) -> u16 {
        Self::index(plane, x, y)
            .map(|(p, i)| self.planes[p].overlays[i])
            .unwrap_or(0)
    }

    pub fn overlay_path(&self, plane: usize, x: i32, y: i32) -> u8 {
        Self::index(plane, x, y)
            .map(|(p, i)| self.planes[p].overlay_paths[i])
            .unwrap_or(0)
    }

    pub fn overlay_rotation(&self, plane: usize, x: i32, y: i32) -> u8 {
        Self::index(plane, x, y)
            .map(|(p, i)| self.planes[p].overlay_rotations[i] & 3)
            .unwrap_or(0)
    }

    pub fn tile_settings(&self, plane: usize, x: i32, y: i32) -> u8 {
        Self::index(plane, x, y)
            .map(|(p, i)| self.planes[p].settings[i])
            .unwrap_or(0)
    }

    /// A bridge tile borrows the terrain of the plane above. The flag lives on plane 1.
    pub fn is_bridge(&self, x: i32, y: i32) -> bool {
        self.tile_settings(1, x, y) & SETTING_BRIDGE != 0
    }

    /// Whether the tile is blocked or void on the given plane.
    pub fn is_hidden(&self, plane: usize, x: i32, y: i32) -> bool {
        self.tile_settings(plane, x, y) & SETTING_HIDDEN != 0
    }

    pub fn set_underlay(&mut self, plane: usize, x: i32, y: i32, id: u16) {
        if let Some((p, i)) = Self::index(plane, x, y) {
            self.planes[p].underlays[i] = id;
        }
    }

    pub fn set_overlay(&mut self, plane: usize, x: i32, y: i32, id: u16, path: u8, rotation: u8) {
        if let Some((p, i)) = Self::index(plane, x, y) {
            self.planes[p].overlays[i] = id;
            self.planes[p].overlay_paths[i] = path;
            self.planes[p].overlay_rotations[i] = rotation & 3;
        }
    }

    pub fn set_tile_settings(&mut self, plane: usize, x: i32, y: i32, settings: u8) {
        if let Some((p, i)) = Self::index(plane, x, y) {
            self.planes[p].settings[i] = settings;
        }
    }

    pub fn add_location(&mut self, location: Location) {
        self.locations.push(location);
    }

    /// Fill every tile of one plane with the same underlay.
    pub fn fill_underlay(&mut self, plane: usize, id: u16) {
        if let Some(tiles) = self.planes.get_mut(plane) {
            tiles.underlays.iter_mut().for_each(|u| *u = id);
        }
    }
}

/// Inclusive bounding box of a set of regions, in region coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub min: RegionCoord,
    pub max: RegionCoord,
}

impl RegionBounds {
    /// Width in regions.
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    /// Height in regions.
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }
}

/// All loaded regions, keyed by region coordinates.
#[derive(Debug, Default, Clone)]
pub struct RegionSet {
    regions: HashMap<RegionCoord, Region>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region, replacing any region at the same coordinates.
    pub fn insert(&mut self, region: Region) {
        self.regions.insert(region.coord, region);
    }

    pub fn get(&self, coord: RegionCoord) -> Option<&Region> {
        self.regions.get(&coord)
    }

    /// Find the region containing a world tile.
    pub fn region_at_world(&self, x: i32, y: i32) -> Option<&Region> {
        self.get(RegionCoord::new(
            x.div_euclid(REGION_SIZE),
            y.div_euclid(REGION_SIZE),
        ))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate over regions in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// All region coordinates, sorted by x then y.
    pub fn coords_sorted(&self) -> Vec<RegionCoord> {
        let mut coords: Vec<_> = self.regions.keys().copied().collect();
        coords.sort();
        coords
    }

    /// Bounding box of all regions, or `None` when empty.
    pub fn bounds(&self) -> Option<RegionBounds> {
        bounds_of(self.regions.keys().copied())
    }
}

/// Bounding box of a collection of region coordinates.
pub fn bounds_of(coords: impl IntoIterator<Item = RegionCoord>) -> Option<RegionBounds> {
    coords.into_iter().fold(None, |acc, c| {
        Some(match acc {
            None => RegionBounds { min: c, max: c },
            Some(b) => RegionBounds {
                min: RegionCoord::new(b.min.x.min(c.x), b.min.y.min(c.y)),
                max: RegionCoord::new(b.max.x.max(c.x), b.max.y.max(c.y)),
            },
        })
    })
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        let mut set = RegionSet::new();
        for region in iter {
            set.insert(region);
        }
        set
    }
}
