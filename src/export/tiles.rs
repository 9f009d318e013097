//! Per-map raster tile export.
//!
//! For every zoom layer and plane, each region a world map contains is
//! rendered natively at `2^layer` pixels per tile and handed to a
//! [`TileSink`] under a deterministic name.

use super::features::ChunkPosition;
use crate::error::{MapError, Result};
use crate::render::{layer_scale, Canvas, LookupSummary, RenderConfig, RenderContext, Renderer};
use crate::types::{RegionCoord, PLANES};
use crate::worldmap::WorldMapDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Tile export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileExportConfig {
    /// Lowest zoom layer; scale is `2^layer` pixels per tile.
    pub min_layer: u32,
    pub max_layer: u32,
    pub min_plane: usize,
    pub max_plane: usize,
    /// Suffix appended to the map id in output folder names.
    pub cache_version: String,
    /// Name tiles by their remapped position.
    pub move_tiles: bool,
    /// Draw upper planes over a blurred ground floor.
    pub floor_background: bool,
    /// Render settings; the scale is replaced per layer.
    pub render: RenderConfig,
}

impl Default for TileExportConfig {
    fn default() -> Self {
        Self {
            min_layer: 2,
            max_layer: 3,
            min_plane: 0,
            max_plane: PLANES - 1,
            cache_version: String::new(),
            move_tiles: false,
            floor_background: true,
            render: RenderConfig::default(),
        }
    }
}

impl TileExportConfig {
    /// Load a configuration from a JSON file; missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the layer and plane ranges can be rendered.
    pub fn validate(&self) -> Result<()> {
        layer_scale(self.max_layer)?;
        if self.min_layer > self.max_layer {
            return Err(MapError::InvalidConfig(format!(
                "min_layer {} is above max_layer {}",
                self.min_layer, self.max_layer
            )));
        }
        if self.min_plane > self.max_plane || self.max_plane >= PLANES {
            return Err(MapError::InvalidConfig(format!(
                "planes {}..={} are not within 0..{}",
                self.min_plane, self.max_plane, PLANES
            )));
        }
        Ok(())
    }

    pub fn with_layers(mut self, min_layer: u32, max_layer: u32) -> Self {
        self.min_layer = min_layer;
        self.max_layer = max_layer.max(min_layer);
        self
    }

    pub fn with_planes(mut self, min_plane: usize, max_plane: usize) -> Self {
        self.min_plane = min_plane.min(PLANES - 1);
        self.max_plane = max_plane.clamp(self.min_plane, PLANES - 1);
        self
    }

    pub fn with_cache_version(mut self, cache_version: impl Into<String>) -> Self {
        self.cache_version = cache_version.into();
        self
    }

    pub fn with_move_tiles(mut self, move_tiles: bool) -> Self {
        self.move_tiles = move_tiles;
        self
    }

    pub fn with_floor_background(mut self, floor_background: bool) -> Self {
        self.floor_background = floor_background;
        self
    }

    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}

/// Identity of one exported tile image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub map_id: i32,
    pub layer: u32,
    pub plane: i32,
    /// Region coordinates.
    pub x: i32,
    pub y: i32,
}

impl TileKey {
    /// `<mapId><cacheVersion>/<layer>/<plane>_<x>_<y>.png`.
    pub fn relative_path(&self, cache_version: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.map_id, cache_version))
            .join(self.layer.to_string())
            .join(format!("{}_{}_{}.png", self.plane, self.x, self.y))
    }
}

/// Destination of rendered tiles.
pub trait TileSink {
    fn write_tile(&mut self, path: &Path, canvas: &Canvas) -> Result<()>;
}

/// Writes tiles as PNG files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TileSink for DirectorySink {
    fn write_tile(&mut self, path: &Path, canvas: &Canvas) -> Result<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, canvas.to_png()?)?;
        Ok(())
    }
}

/// Keeps tiles in memory, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub tiles: BTreeMap<PathBuf, Canvas>,
}

impl TileSink for MemorySink {
    fn write_tile(&mut self, path: &Path, canvas: &Canvas) -> Result<()> {
        self.tiles.insert(path.to_path_buf(), canvas.clone());
        Ok(())
    }
}

/// Outcome of exporting one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub tiles_written: usize,
    /// Units that failed to encode or write; the export carried on.
    pub failed: usize,
    /// Regions exported on the lowest layer.
    pub chunks: Vec<ChunkPosition>,
    pub lookups: LookupSummary,
}

/// Drives tile export for world maps.
pub struct MapTileExporter<'a> {
    ctx: RenderContext<'a>,
    config: TileExportConfig,
}

impl<'a> MapTileExporter<'a> {
    pub fn new(ctx: RenderContext<'a>, config: TileExportConfig) -> Self {
        Self { ctx, config }
    }

    pub fn config(&self) -> &TileExportConfig {
        &self.config
    }

    /// Render every region the map contains at every configured layer and plane.
    ///
    /// An invalid configuration is rejected before anything is drawn; failed
    /// tiles after that are logged and counted in the summary.
    pub fn export_map(&self, map: &WorldMapDefinition, sink: &mut dyn TileSink) -> Result<ExportSummary> {
        self.config.validate()?;
        let mut summary = ExportSummary::default();
        let Some(bounds) = self.ctx.regions.bounds() else {
            log::warn!("No regions loaded, nothing to export for map {}", map.id);
            return Ok(summary);
        };

        let max_plane = self.config.max_plane;
        let mut misses = Vec::new();

        for layer in self.config.min_layer..=self.config.max_layer {
            let render = self.config.render.clone().with_scale(layer_scale(layer)?);
            let renderer = Renderer::new(self.ctx, render);

            for plane in self.config.min_plane..=max_plane {
                let z = plane as i32;
                for x in bounds.min.x..=bounds.max.x {
                    for y in bounds.min.y..=bounds.max.y {
                        if !map.contains(x, y, z) {
                            continue;
                        }
                        let Some(region) = self.ctx.regions.get(RegionCoord::new(x, y)) else {
                            log::debug!("Map {} contains region ({}, {}) but it is not loaded", map.id, x, y);
                            continue;
                        };

                        let canvas = if self.config.floor_background && plane > 0 {
                            renderer.render_with_background(Some(region), plane)
                        } else {
                            renderer.render_region(Some(region), plane, false)
                        };

                        if layer == self.config.min_layer {
                            summary.chunks.push(ChunkPosition { x, y, z });
                        }

                        for key in self.tile_keys(map, layer, x, y, z) {
                            let path = key.relative_path(&self.config.cache_version);
                            match sink.write_tile(&path, &canvas) {
                                Ok(()) => summary.tiles_written += 1,
                                Err(e) => {
                                    summary.failed += 1;
                                    log::error!(
                                        "Failed to export map {} layer {} plane {} region ({}, {}): {}",
                                        map.id,
                                        layer,
                                        plane,
                                        x,
                                        y,
                                        e
                                    );
                                }
                            }
                        }
                    }
                }
            }

            let lookups = renderer.stats().summary();
            if !lookups.is_empty() {
                log::warn!("Map {} layer {}: {}", map.id, layer, lookups);
            }
            misses.push(lookups);
            log::info!("Finished map {} layer {}", map.id, layer);
        }

        // layers visit the same tiles; report the first one
        summary.lookups = misses.into_iter().next().unwrap_or_default();
        Ok(summary)
    }

    /// Names a rendered region is written under.
    ///
    /// With `move_tiles`, the remapped name is used; an upper-floor region
    /// whose remap moves it to another plane is also kept at its own name.
    fn tile_keys(&self, map: &WorldMapDefinition, layer: u32, x: i32, y: i32, z: i32) -> Vec<TileKey> {
        let own = TileKey {
            map_id: map.id,
            layer,
            plane: z,
            x,
            y,
        };
        if !self.config.move_tiles {
            return vec![own];
        }

        let moved = map.remap(x, y, z);
        let remapped = TileKey {
            plane: moved.z,
            x: moved.x,
            y: moved.y,
            ..own
        };
        if moved.z != z && z != 0 {
            vec![remapped, own]
        } else {
            vec![remapped]
        }
    }

    /// Export several maps into the same sink.
    pub fn export_maps<'m>(
        &self,
        maps: impl IntoIterator<Item = &'m WorldMapDefinition>,
        sink: &mut dyn TileSink,
    ) -> Result<Vec<(i32, ExportSummary)>> {
        maps.into_iter()
            .map(|map| Ok((map.id, self.export_map(map, sink)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MapAssets;
    use crate::error::MapError;
    use crate::region::RegionSet;
    use crate::shapes::TileShapes;
    use crate::test_support::{test_assets, test_shapes, uniform_region};
    use crate::types::Position;
    use crate::worldmap::RegionRule;

    struct Fixture {
        assets: MapAssets,
        regions: RegionSet,
        shapes: TileShapes,
    }

    fn fixture() -> Fixture {
        let mut upper = uniform_region(20, 20, 0, 1);
        upper.fill_underlay(1, 2);
        Fixture {
            assets: test_assets(),
            regions: vec![uniform_region(50, 50, 0, 1), uniform_region(51, 50, 0, 2), upper]
                .into_iter()
                .collect(),
            shapes: test_shapes(),
        }
    }

    fn surface() -> WorldMapDefinition {
        WorldMapDefinition::new(0, "Surface", Position::new(3200, 3200, 0))
            .with_rule(RegionRule::Remap {
                old_plane: 1,
                old_x: 20,
                old_y: 20,
                new_x: 60,
                new_y: 60,
            })
            .with_rule(RegionRule::Rect {
                x_low: 40,
                y_low: 40,
                x_high: 60,
                y_high: 60,
            })
    }

    fn config() -> TileExportConfig {
        TileExportConfig::default()
            .with_layers(0, 1)
            .with_planes(0, 1)
            .with_cache_version("_test")
    }

    struct FailingSink;

    impl TileSink for FailingSink {
        fn write_tile(&mut self, path: &Path, _canvas: &Canvas) -> Result<()> {
            Err(MapError::Export(path.display().to_string()))
        }
    }

    #[test]
    fn test_tile_key_path() {
        let key = TileKey {
            map_id: 3,
            layer: 2,
            plane: 1,
            x: 50,
            y: 53,
        };
        assert_eq!(key.relative_path("_2019"), PathBuf::from("3_2019/2/1_50_53.png"));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: TileExportConfig =
            serde_json::from_str(r#"{"max_layer": 5, "render": {"blend_radius": 3}}"#).unwrap();
        assert_eq!(config.min_layer, 2);
        assert_eq!(config.max_layer, 5);
        assert!(config.floor_background);
        assert_eq!(config.render.blend_radius, 3);
        assert_eq!(config.render.scale, 4);
    }

    #[test]
    fn test_out_of_range_layers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"min_layer": 32, "max_layer": 32}"#).unwrap();
        assert!(matches!(TileExportConfig::load(&path), Err(MapError::InvalidConfig(_))));

        let f = fixture();
        let mut config = config();
        config.min_layer = 32;
        config.max_layer = 32;
        let exporter = MapTileExporter::new(RenderContext::new(&f.assets, &f.regions, &f.shapes), config);
        let mut sink = MemorySink::default();
        let result = exporter.export_map(&surface(), &mut sink);
        assert!(matches!(result, Err(MapError::InvalidConfig(_))));
        assert!(sink.tiles.is_empty());
    }

    #[test]
    fn test_validate_layer_and_plane_order() {
        assert!(TileExportConfig::default().validate().is_ok());
        let mut config = TileExportConfig::default();
        config.min_layer = 4;
        assert!(config.validate().is_err());
        let mut config = TileExportConfig::default();
        config.max_plane = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_names_and_scales() {
        let f = fixture();
        let exporter = MapTileExporter::new(RenderContext::new(&f.assets, &f.regions, &f.shapes), config());
        let mut sink = MemorySink::default();
        let summary = exporter.export_map(&surface(), &mut sink).unwrap();

        // two surface regions on planes 0 and 1, plus the remap region on both planes, at two layers
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.tiles_written, sink.tiles.len());
        let tile = &sink.tiles[&PathBuf::from("0_test/0/0_50_50.png")];
        assert_eq!(tile.width(), 64);
        let tile = &sink.tiles[&PathBuf::from("0_test/1/1_51_50.png")];
        assert_eq!(tile.width(), 128);
        assert!(sink.tiles.contains_key(&PathBuf::from("0_test/0/1_20_20.png")));
        assert_eq!(summary.chunks.len(), 6);
        assert!(summary.lookups.is_empty());
    }

    #[test]
    fn test_move_tiles_uses_remap() {
        let f = fixture();
        let exporter = MapTileExporter::new(
            RenderContext::new(&f.assets, &f.regions, &f.shapes),
            config().with_move_tiles(true),
        );
        let mut sink = MemorySink::default();
        exporter.export_map(&surface(), &mut sink).unwrap();

        // plane 1 of region (20, 20) is remapped to (60, 60) on plane 0 and kept at its own name
        assert!(sink.tiles.contains_key(&PathBuf::from("0_test/0/0_60_60.png")));
        assert!(sink.tiles.contains_key(&PathBuf::from("0_test/0/1_20_20.png")));
        // plane 0 does not match the remap rule's plane and stays put
        assert!(sink.tiles.contains_key(&PathBuf::from("0_test/0/0_20_20.png")));
    }

    #[test]
    fn test_failed_units_are_counted() {
        let f = fixture();
        let exporter = MapTileExporter::new(RenderContext::new(&f.assets, &f.regions, &f.shapes), config());
        let summary = exporter.export_map(&surface(), &mut FailingSink).unwrap();
        assert_eq!(summary.tiles_written, 0);
        assert_eq!(summary.failed, 12);
    }

    #[test]
    fn test_directory_sink_writes_png() {
        let f = fixture();
        let dir = tempfile::tempdir().unwrap();
        let exporter = MapTileExporter::new(
            RenderContext::new(&f.assets, &f.regions, &f.shapes),
            config().with_layers(0, 0).with_planes(0, 0),
        );
        let summary = exporter
            .export_map(&surface(), &mut DirectorySink::new(dir.path()))
            .unwrap();
        assert_eq!(summary.tiles_written, 3);

        let png = dir.path().join("0_test/0/0_50_50.png");
        let img = image::open(png).unwrap();
        assert_eq!((img.width(), img.height()), (64, 64));
    }
}
