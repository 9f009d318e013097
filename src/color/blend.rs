//! Terrain colour blending across tiles and region boundaries.
//!
//! Underlay colours are averaged over a square window around each tile with
//! an incremental sliding-window sum: column sums are slid horizontally, then
//! a vertical window is slid over those column sums. Tiles outside the
//! available regions contribute nothing, and only present tiles count
//! towards the divisor.

use super::palette::{pack_hsl, ColorPalette};
use crate::assets::{LookupKind, LookupStats, MapAssets, OverlayDefinition, UnderlayDefinition};
use crate::region::{Region, RegionSet};
use crate::types::{RegionCoord, REGION_SIZE};

/// Averaged colour of a tile, on the 0-255 scale per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub hue: i32,
    pub saturation: i32,
    pub lightness: i32,
}

impl Hsl {
    pub fn packed(&self) -> i32 {
        pack_hsl(self.hue, self.saturation, self.lightness)
    }
}

/// How the overlay of one tile should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPaint {
    /// Shape id (1-12); shape 1 covers the whole tile.
    pub shape: u8,
    pub rotation: u8,
    /// Resolved RGB colour, `None` when the overlay is transparent.
    pub color: Option<u32>,
}

/// Resolved colours of one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TilePaint {
    /// Blended underlay RGB, `None` when the tile has no underlay.
    pub underlay: Option<u32>,
    pub overlay: Option<OverlayPaint>,
}

/// Resolved colours for every tile of one plane, indexed `x + 64 * y`.
#[derive(Debug, Clone)]
pub struct BlendedPlane {
    tiles: Vec<TilePaint>,
}

impl BlendedPlane {
    pub fn get(&self, x: i32, y: i32) -> TilePaint {
        if !(0..REGION_SIZE).contains(&x) || !(0..REGION_SIZE).contains(&y) {
            return TilePaint::default();
        }
        self.tiles[(x + y * REGION_SIZE) as usize]
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    hue: i32,
    saturation: i32,
    lightness: i32,
    multiplier: i32,
    count: i32,
}

impl Accumulator {
    fn add_def(&mut self, def: &UnderlayDefinition) {
        self.hue += def.hue;
        self.saturation += def.saturation;
        self.lightness += def.lightness;
        self.multiplier += def.hue_multiplier;
        self.count += 1;
    }

    fn remove_def(&mut self, def: &UnderlayDefinition) {
        self.hue -= def.hue;
        self.saturation -= def.saturation;
        self.lightness -= def.lightness;
        self.multiplier -= def.hue_multiplier;
        self.count -= 1;
    }

    fn add(&mut self, other: &Accumulator) {
        self.hue += other.hue;
        self.saturation += other.saturation;
        self.lightness += other.lightness;
        self.multiplier += other.multiplier;
        self.count += other.count;
    }

    fn remove(&mut self, other: &Accumulator) {
        self.hue -= other.hue;
        self.saturation -= other.saturation;
        self.lightness -= other.lightness;
        self.multiplier -= other.multiplier;
        self.count -= other.count;
    }

    fn average(&self) -> Option<Hsl> {
        if self.count == 0 {
            return None;
        }
        Some(Hsl {
            hue: if self.multiplier == 0 {
                0
            } else {
                self.hue * 256 / self.multiplier
            },
            saturation: self.saturation / self.count,
            lightness: (self.lightness / self.count).clamp(0, 255),
        })
    }
}

/// The Color-Blend Engine. Borrows the immutable tables for one render.
pub struct BlendEngine<'a> {
    assets: &'a MapAssets,
    regions: &'a RegionSet,
    palette: &'a ColorPalette,
    stats: &'a LookupStats,
    radius: i32,
}

impl<'a> BlendEngine<'a> {
    pub fn new(
        assets: &'a MapAssets,
        regions: &'a RegionSet,
        palette: &'a ColorPalette,
        stats: &'a LookupStats,
        radius: u32,
    ) -> Self {
        Self {
            assets,
            regions,
            palette,
            stats,
            radius: radius as i32,
        }
    }

    /// Underlay definition of a tile given in coordinates local to `region`.
    ///
    /// Coordinates outside the region resolve through the region set.
    fn underlay_at(&self, region: &Region, plane: usize, x: i32, y: i32) -> Option<&'a UnderlayDefinition> {
        let id = if (0..REGION_SIZE).contains(&x) && (0..REGION_SIZE).contains(&y) {
            region.underlay_id(plane, x, y)
        } else {
            let wx = region.base_x() + x;
            let wy = region.base_y() + y;
            let neighbour = self.regions.region_at_world(wx, wy)?;
            neighbour.underlay_id(
                plane,
                wx.rem_euclid(REGION_SIZE),
                wy.rem_euclid(REGION_SIZE),
            )
        };
        if id == 0 {
            return None;
        }
        self.assets.underlay(id as i32 - 1)
    }

    /// Averaged underlay colour for every tile of the region that has an underlay.
    pub fn average_underlays(&self, region: &Region, plane: usize) -> Vec<Option<Hsl>> {
        let n = REGION_SIZE;
        let r = self.radius;
        let coord = region.coord;
        let has = |dx: i32, dy: i32| {
            self.regions
                .get(RegionCoord::new(coord.x + dx, coord.y + dy))
                .is_some()
        };

        let x_lo = if has(-1, 0) { -r } else { 0 };
        let x_hi = n + if has(1, 0) { r } else { 0 };
        let y_lo = if has(0, -1) { -r } else { 0 };
        let y_hi = n + if has(0, 1) { r } else { 0 };

        let mut columns = vec![Accumulator::default(); (n + 2 * r) as usize];
        let mut out = vec![None; (n * n) as usize];

        for xi in (x_lo - r)..(x_hi + r) {
            let entering = xi + r;
            let leaving = xi - r;
            for yi in y_lo..y_hi {
                let column = &mut columns[(yi + r) as usize];
                if (x_lo..x_hi).contains(&entering) {
                    if let Some(def) = self.underlay_at(region, plane, entering, yi) {
                        column.add_def(def);
                    }
                }
                if (x_lo..x_hi).contains(&leaving) {
                    if let Some(def) = self.underlay_at(region, plane, leaving, yi) {
                        column.remove_def(def);
                    }
                }
            }

            if !(0..n).contains(&xi) {
                continue;
            }

            let mut window = Accumulator::default();
            for yi in (y_lo - r)..(y_hi + r) {
                let entering = yi + r;
                let leaving = yi - r;
                if (y_lo..y_hi).contains(&entering) {
                    window.add(&columns[(entering + r) as usize]);
                }
                if (y_lo..y_hi).contains(&leaving) {
                    window.remove(&columns[(leaving + r) as usize]);
                }
                if (0..n).contains(&yi) && region.underlay_id(plane, xi, yi) > 0 {
                    out[(xi + yi * n) as usize] = window.average();
                }
            }
        }

        out
    }

    /// Resolve the overlay colour of a definition to RGB; `None` = do not draw.
    pub fn overlay_color(&self, def: &OverlayDefinition) -> Option<u32> {
        if def.has_secondary() {
            let hsl = pack_hsl(def.other_hue, def.other_saturation, def.other_lightness);
            return Some(self.palette.terrain_color(hsl));
        }
        if def.has_texture() {
            let hsl = self
                .stats
                .track(LookupKind::Texture, def.texture, self.assets.texture_color(def.texture))?;
            return Some(self.palette.terrain_color(hsl));
        }
        if def.is_transparent() {
            return None;
        }
        Some(
            self.palette
                .terrain_color(pack_hsl(def.hue, def.saturation, def.lightness)),
        )
    }

    /// Blend underlays and resolve overlays for one plane of a region.
    pub fn blend_plane(&self, region: &Region, plane: usize) -> BlendedPlane {
        let averages = self.average_underlays(region, plane);
        let mut tiles = vec![TilePaint::default(); averages.len()];

        for y in 0..REGION_SIZE {
            for x in 0..REGION_SIZE {
                let index = (x + y * REGION_SIZE) as usize;
                let underlay_id = region.underlay_id(plane, x, y);
                let underlay = match averages[index] {
                    Some(hsl) => Some(self.palette.terrain_color(hsl.packed())),
                    None => {
                        if underlay_id > 0 {
                            self.stats.record(LookupKind::Underlay, underlay_id as i32 - 1);
                        }
                        None
                    }
                };

                let overlay_id = region.overlay_id(plane, x, y);
                let overlay = if overlay_id > 0 {
                    let id = overlay_id as i32 - 1;
                    self.stats
                        .track(LookupKind::Overlay, id, self.assets.overlay(id))
                        .map(|def| OverlayPaint {
                            shape: region.overlay_path(plane, x, y).saturating_add(1),
                            rotation: region.overlay_rotation(plane, x, y),
                            color: self.overlay_color(def),
                        })
                } else {
                    None
                };

                tiles[index] = TilePaint { underlay, overlay };
            }
        }

        BlendedPlane { tiles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_assets, uniform_region};

    fn engine<'a>(
        assets: &'a MapAssets,
        regions: &'a RegionSet,
        palette: &'a ColorPalette,
        stats: &'a LookupStats,
    ) -> BlendEngine<'a> {
        BlendEngine::new(assets, regions, palette, stats, 5)
    }

    /// O(n·r²) reference over the same window the sliding sum produces.
    fn brute_force(
        engine: &BlendEngine<'_>,
        region: &Region,
        plane: usize,
        bounds: (i32, i32, i32, i32),
    ) -> Vec<Option<Hsl>> {
        let (x_lo, x_hi, y_lo, y_hi) = bounds;
        let r = engine.radius;
        let mut out = vec![None; (REGION_SIZE * REGION_SIZE) as usize];
        for y in 0..REGION_SIZE {
            for x in 0..REGION_SIZE {
                if region.underlay_id(plane, x, y) == 0 {
                    continue;
                }
                let mut acc = Accumulator::default();
                for nx in (x - r + 1)..=(x + r) {
                    for ny in (y - r + 1)..=(y + r) {
                        if !(x_lo..x_hi).contains(&nx) || !(y_lo..y_hi).contains(&ny) {
                            continue;
                        }
                        if let Some(def) = engine.underlay_at(region, plane, nx, ny) {
                            acc.add_def(def);
                        }
                    }
                }
                out[(x + y * REGION_SIZE) as usize] = acc.average();
            }
        }
        out
    }

    #[test]
    fn test_uniform_region_keeps_own_colour() {
        let assets = test_assets();
        let region = uniform_region(50, 50, 0, 2);
        let regions: RegionSet = vec![region.clone()].into_iter().collect();
        let palette = ColorPalette::default();
        let stats = LookupStats::new();
        let engine = engine(&assets, &regions, &palette, &stats);

        let def = assets.underlay(1).unwrap();
        let averages = engine.average_underlays(&region, 0);
        for avg in averages {
            let avg = avg.unwrap();
            assert_eq!(avg.hue, def.effective_hue());
            assert_eq!(avg.saturation, def.saturation);
            assert_eq!(avg.lightness, def.lightness);
        }
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_sliding_window_matches_brute_force() {
        let assets = test_assets();
        let mut region = Region::new(RegionCoord::new(20, 20));
        for y in 0..10 {
            for x in 0..10 {
                let id = ((x * 7 + y * 3) % 5) as u16;
                region.set_underlay(0, x, y, id);
            }
        }
        let regions = RegionSet::new();
        let palette = ColorPalette::default();
        let stats = LookupStats::new();
        let engine = engine(&assets, &regions, &palette, &stats);

        let fast = engine.average_underlays(&region, 0);
        let slow = brute_force(&engine, &region, 0, (0, REGION_SIZE, 0, REGION_SIZE));
        assert_eq!(fast, slow);
        assert!(fast[1].is_some());
        assert!(fast[(10 + 10 * REGION_SIZE) as usize].is_none());
    }

    #[test]
    fn test_window_reaches_into_neighbour_region() {
        let assets = test_assets();
        let center = uniform_region(30, 30, 0, 1);
        let east = uniform_region(31, 30, 0, 2);
        let regions: RegionSet = vec![center.clone(), east].into_iter().collect();
        let palette = ColorPalette::default();
        let stats = LookupStats::new();
        let engine = engine(&assets, &regions, &palette, &stats);

        let fast = engine.average_underlays(&center, 0);
        let slow = brute_force(&engine, &center, 0, (0, REGION_SIZE + 5, 0, REGION_SIZE));
        assert_eq!(fast, slow);

        let own = assets.underlay(0).unwrap();
        let west_edge = fast[(32 * REGION_SIZE) as usize].unwrap();
        let east_edge = fast[(63 + 32 * REGION_SIZE) as usize].unwrap();
        assert_eq!(west_edge.saturation, own.saturation);
        assert_ne!(east_edge.saturation, own.saturation);
    }

    #[test]
    fn test_overlay_colour_sources() {
        let assets = test_assets();
        let regions = RegionSet::new();
        let palette = ColorPalette::default();
        let stats = LookupStats::new();
        let engine = engine(&assets, &regions, &palette, &stats);

        let flat = assets.overlay(0).unwrap();
        assert_eq!(
            engine.overlay_color(flat),
            Some(palette.terrain_color(pack_hsl(20, 100, 180)))
        );
        assert_eq!(engine.overlay_color(assets.overlay(1).unwrap()), None);
        assert_eq!(
            engine.overlay_color(assets.overlay(2).unwrap()),
            Some(palette.terrain_color((10 << 10) + (3 << 7) + 70))
        );
        assert_eq!(
            engine.overlay_color(assets.overlay(3).unwrap()),
            Some(palette.terrain_color(pack_hsl(100, 200, 90)))
        );
    }

    #[test]
    fn test_missing_definitions_are_counted() {
        let assets = test_assets();
        let mut region = Region::new(RegionCoord::new(1, 1));
        region.set_underlay(0, 0, 0, 99);
        region.set_overlay(0, 1, 0, 77, 0, 0);
        let regions = RegionSet::new();
        let palette = ColorPalette::default();
        let stats = LookupStats::new();
        let engine = engine(&assets, &regions, &palette, &stats);

        let plane = engine.blend_plane(&region, 0);
        assert_eq!(plane.get(0, 0), TilePaint::default());
        assert_eq!(plane.get(1, 0).overlay, None);
        assert_eq!(stats.count(LookupKind::Underlay), 1);
        assert_eq!(stats.count(LookupKind::Overlay), 1);
    }

    #[test]
    fn test_blend_plane_resolves_overlay_shape() {
        let assets = test_assets();
        let mut region = uniform_region(1, 1, 0, 1);
        region.set_overlay(0, 4, 4, 1, 6, 2);
        let regions = RegionSet::new();
        let palette = ColorPalette::default();
        let stats = LookupStats::new();
        let engine = engine(&assets, &regions, &palette, &stats);

        let paint = engine.blend_plane(&region, 0).get(4, 4);
        assert!(paint.underlay.is_some());
        let overlay = paint.overlay.unwrap();
        assert_eq!(overlay.shape, 7);
        assert_eq!(overlay.rotation, 2);
        assert!(overlay.color.is_some());
    }

    #[test]
    fn test_out_of_range_overlay_path() {
        let assets = test_assets();
        let mut region = uniform_region(1, 1, 0, 1);
        region.set_overlay(0, 4, 4, 1, u8::MAX, 0);
        let regions = RegionSet::new();
        let palette = ColorPalette::default();
        let stats = LookupStats::new();
        let engine = engine(&assets, &regions, &palette, &stats);

        let overlay = engine.blend_plane(&region, 0).get(4, 4).overlay.unwrap();
        assert_eq!(overlay.shape, u8::MAX);
    }
}
