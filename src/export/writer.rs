//! Feature file layouts and JSON writers.

use super::features::ChunkPosition;
use crate::error::Result;
use crate::worldmap::BaseMapEntry;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `{"type": "FeatureCollection", "features": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<T> {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<T>,
}

impl<T> FeatureCollection<T> {
    pub fn new(features: Vec<T>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// `{"items": [...]}`, used for objects and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList<T> {
    pub items: Vec<T>,
}

/// Exported chunks of one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapChunks {
    pub map_id: i32,
    pub name: String,
    pub chunks: Vec<ChunkPosition>,
}

/// `{"chunkPos": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPositionFile {
    pub chunk_pos: Vec<MapChunks>,
}

/// `{"baseMaps": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMapsFile {
    pub base_maps: Vec<BaseMapEntry>,
}

/// Write a value as pretty-printed JSON.
pub fn write_json<T: Serialize, W: Write>(writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Write a value as pretty-printed JSON to a file, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, value)?;
    writer.flush()?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Writes one JSON record per line.
pub struct JsonLinesWriter<W: Write> {
    inner: W,
    records: usize,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    pub fn write_all<'a, T: Serialize + 'a>(&mut self, records: impl IntoIterator<Item = &'a T>) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::features::IconFeature;

    #[test]
    fn test_feature_collection_layout() {
        let icons = vec![IconFeature {
            icon: "bank".to_string(),
            x: 1,
            y: 2,
            plane: 0,
        }];
        let geo: Vec<_> = icons.iter().map(|i| i.to_geojson(0)).collect();
        let json = serde_json::to_value(FeatureCollection::new(geo)).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["properties"]["icon"], "bank");
    }

    #[test]
    fn test_chunk_and_base_map_files() {
        let chunks = ChunkPositionFile {
            chunk_pos: vec![MapChunks {
                map_id: 0,
                name: "Surface".to_string(),
                chunks: vec![ChunkPosition { x: 50, y: 50, z: 0 }],
            }],
        };
        let json = serde_json::to_value(&chunks).unwrap();
        assert_eq!(json["chunkPos"][0]["mapId"], 0);
        assert_eq!(json["chunkPos"][0]["chunks"][0]["x"], 50);

        let json = serde_json::to_value(BaseMapsFile::default()).unwrap();
        assert_eq!(json, serde_json::json!({"baseMaps": []}));

        let json = serde_json::to_value(ItemList::<i32> { items: vec![1, 2] }).unwrap();
        assert_eq!(json, serde_json::json!({"items": [1, 2]}));
    }

    #[test]
    fn test_json_lines() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        let records = vec![
            ChunkPosition { x: 1, y: 2, z: 0 },
            ChunkPosition { x: 3, y: 4, z: 1 },
        ];
        writer.write_all(&records).unwrap();
        assert_eq!(writer.records(), 2);
        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\"x\":1,\"y\":2,\"z\":0}\n{\"x\":3,\"y\":4,\"z\":1}\n");
    }

    #[test]
    fn test_write_json_file_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/features/objects.json");
        write_json_file(&path, &ItemList::<i32> { items: vec![] }).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({"items": []}));
    }
}
