//! Export of raster tiles and feature files.
//!
//! Tiles go through a [`TileSink`]; feature records are plain serde types
//! written with the helpers in [`writer`].

pub mod features;
pub mod tiles;
pub mod writer;

pub use features::{
    ChunkPosition, FeatureExporter, IconFeature, LabelFeature, MapFeatures, ObjectFeature,
};
pub use tiles::{
    DirectorySink, ExportSummary, MapTileExporter, MemorySink, TileExportConfig, TileKey, TileSink,
};
pub use writer::{
    write_json, write_json_file, BaseMapsFile, ChunkPositionFile, FeatureCollection, ItemList,
    JsonLinesWriter, MapChunks,
};
