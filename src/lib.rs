//! # World Map Tiler
//!
//! A Rust library for rendering tiled world-map rasters and feature data
//! from decoded game regions.
//!
//! ## Overview
//!
//! This library takes a map dump (decoded regions, definition tables and
//! sprites) plus a set of tile-shape masks as input, and produces PNG tiles
//! per zoom layer and plane, a stitched overview canvas, and icon, label
//! and object feature records.
//!
//! ## Quick Start
//!
//! ```ignore
//! use world_map_tiler::{load_map_data, DirectorySink, MapTileExporter, RenderContext,
//!     TileExportConfig, TileShapes};
//!
//! let data = load_map_data("path/to/dump.zip")?;
//! let shapes = TileShapes::load_from_dir("path/to/shapes")?;
//!
//! let ctx = RenderContext::new(&data.assets, &data.regions, &shapes);
//! let exporter = MapTileExporter::new(ctx, TileExportConfig::default());
//!
//! let mut sink = DirectorySink::new("out/tiles");
//! for map in &data.world_maps {
//!     let summary = exporter.export_map(map, &mut sink)?;
//!     println!("map {}: {} tiles", map.id, summary.tiles_written);
//! }
//! ```
//!
//! ## Single Canvas
//!
//! To draw every loaded region into one image instead of tiles:
//!
//! ```ignore
//! use world_map_tiler::{Renderer, RenderConfig, WorldStitcher};
//!
//! let renderer = Renderer::new(ctx, RenderConfig::default().with_scale(4));
//! let canvas = WorldStitcher::new(&renderer).stitch_all(0, false);
//! std::fs::write("world.png", canvas.to_png()?)?;
//! ```

pub mod assets;
pub mod color;
pub mod error;
pub mod export;
pub mod region;
pub mod render;
pub mod shapes;
pub mod types;
pub mod worldmap;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use assets::{LookupKind, LookupStats, LookupSummary, MapAssets, MapData, SpriteData};
pub use color::{BlendEngine, ColorPalette};
pub use error::{MapError, Result};
pub use export::{
    DirectorySink, ExportSummary, FeatureExporter, MapFeatures, MapTileExporter, MemorySink,
    TileExportConfig, TileSink,
};
pub use region::{Region, RegionSet};
pub use render::{Canvas, RenderConfig, RenderContext, Renderer, WorldStitcher};
pub use shapes::TileShapes;
pub use types::{Location, LocationKind, Orientation, Position, RegionCoord};
pub use worldmap::{RegionRule, WorldMapDefinition};

/// Load a map dump from a file path (ZIP or directory).
pub fn load_map_data<P: AsRef<std::path::Path>>(path: P) -> Result<MapData> {
    assets::loader::load_from_path(path)
}

/// Load a map dump from the bytes of a ZIP archive.
pub fn load_map_data_from_bytes(data: &[u8]) -> Result<MapData> {
    assets::loader::load_from_bytes(data)
}
