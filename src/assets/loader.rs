//! Map dump loading from ZIP files and directories.
//!
//! Layout (identical in both forms):
//!
//! ```text
//! underlays.json  overlays.json  objects.json  areas.json
//! textures.json   icon_names.json  worldmaps.json
//! regions/<x>_<y>.json
//! sprites/<id>_<frame>.png
//! mapscene/<frame>.png
//! ```

use super::sprite::load_sprite_from_bytes;
use super::{
    AreaDefinition, IconName, MapAssets, MapData, ObjectDefinition, OverlayDefinition,
    TextureColor, UnderlayDefinition,
};
use crate::error::{MapError, Result};
use crate::region::Region;
use crate::worldmap::WorldMapDefinition;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

/// Load a map dump from a file path.
///
/// Supports both ZIP files and directories.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<MapData> {
    let path = path.as_ref();

    if path.is_dir() {
        load_from_directory(path)
    } else {
        let data = std::fs::read(path)?;
        load_from_bytes(&data)
    }
}

/// Load a map dump from bytes (ZIP data).
pub fn load_from_bytes(data: &[u8]) -> Result<MapData> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut map = MapData::default();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let file_path = file.name().to_string();

        let Some(entry) = parse_dump_path(&file_path) else {
            continue;
        };
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        apply_entry(&mut map, entry, &file_path, &contents)?;
    }

    log_summary(&map);
    Ok(map)
}

/// Load a map dump from a directory.
fn load_from_directory(path: &Path) -> Result<MapData> {
    let mut map = MapData::default();

    let mut found_any = false;
    for name in TABLE_FILES {
        let file = path.join(name);
        if file.is_file() {
            found_any = true;
            let contents = std::fs::read(&file)?;
            if let Some(entry) = parse_dump_path(name) {
                apply_entry(&mut map, entry, name, &contents)?;
            }
        }
    }

    for dir in ["regions", "sprites", "mapscene"] {
        let dir_path = path.join(dir);
        if !dir_path.is_dir() {
            continue;
        }
        found_any = true;
        for file in std::fs::read_dir(&dir_path)? {
            let file = file?;
            if !file.file_type()?.is_file() {
                continue;
            }
            let relative = format!("{}/{}", dir, file.file_name().to_string_lossy());
            if let Some(entry) = parse_dump_path(&relative) {
                let contents = std::fs::read(file.path())?;
                apply_entry(&mut map, entry, &relative, &contents)?;
            }
        }
    }

    if !found_any {
        return Err(MapError::InvalidMapData(format!(
            "no map dump files found in {}",
            path.display()
        )));
    }

    log_summary(&map);
    Ok(map)
}

const TABLE_FILES: [&str; 7] = [
    "underlays.json",
    "overlays.json",
    "objects.json",
    "areas.json",
    "textures.json",
    "icon_names.json",
    "worldmaps.json",
];

/// A recognised file in a map dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DumpEntry {
    Underlays,
    Overlays,
    Objects,
    Areas,
    Textures,
    IconNames,
    WorldMaps,
    Region,
    Sprite { id: i32, frame: i32 },
    MapScene { frame: i32 },
}

/// Classify a dump-relative path.
fn parse_dump_path(file_path: &str) -> Option<DumpEntry> {
    let file_path = file_path.trim_start_matches("./");
    match file_path {
        "underlays.json" => return Some(DumpEntry::Underlays),
        "overlays.json" => return Some(DumpEntry::Overlays),
        "objects.json" => return Some(DumpEntry::Objects),
        "areas.json" => return Some(DumpEntry::Areas),
        "textures.json" => return Some(DumpEntry::Textures),
        "icon_names.json" => return Some(DumpEntry::IconNames),
        "worldmaps.json" => return Some(DumpEntry::WorldMaps),
        _ => {}
    }

    let (dir, name) = file_path.split_once('/')?;
    match dir {
        "regions" if name.ends_with(".json") => Some(DumpEntry::Region),
        "sprites" => {
            let stem = name.strip_suffix(".png")?;
            let (id, frame) = stem.split_once('_')?;
            Some(DumpEntry::Sprite {
                id: id.parse().ok()?,
                frame: frame.parse().ok()?,
            })
        }
        "mapscene" => {
            let stem = name.strip_suffix(".png")?;
            Some(DumpEntry::MapScene {
                frame: stem.parse().ok()?,
            })
        }
        _ => None,
    }
}

fn apply_entry(map: &mut MapData, entry: DumpEntry, file_path: &str, contents: &[u8]) -> Result<()> {
    match entry {
        DumpEntry::Underlays => {
            for def in parse_table::<UnderlayDefinition>(file_path, contents) {
                map.assets.add_underlay(def);
            }
        }
        DumpEntry::Overlays => {
            for def in parse_table::<OverlayDefinition>(file_path, contents) {
                map.assets.add_overlay(def);
            }
        }
        DumpEntry::Objects => {
            for def in parse_table::<ObjectDefinition>(file_path, contents) {
                map.assets.add_object(def);
            }
        }
        DumpEntry::Areas => {
            for def in parse_table::<AreaDefinition>(file_path, contents) {
                map.assets.add_area(def);
            }
        }
        DumpEntry::Textures => {
            for tex in parse_table::<TextureColor>(file_path, contents) {
                map.assets.texture_colors.insert(tex.id, tex.average_hsl);
            }
        }
        DumpEntry::IconNames => {
            for icon in parse_table::<IconName>(file_path, contents) {
                map.assets.icon_names.insert(icon.id, icon.name);
            }
        }
        DumpEntry::WorldMaps => {
            map.world_maps
                .extend(parse_table::<WorldMapDefinition>(file_path, contents));
        }
        DumpEntry::Region => {
            let parsed = std::str::from_utf8(contents)
                .map_err(|e| MapError::InvalidRegion(e.to_string()))
                .and_then(Region::from_json);
            match parsed {
                Ok(region) => map.regions.insert(region),
                Err(e) => log::warn!("Skipping region {}: {}", file_path, e),
            }
        }
        DumpEntry::Sprite { id, frame } => match load_sprite_from_bytes(contents) {
            Ok(sprite) => map.assets.add_sprite(id, frame, sprite),
            Err(e) => log::warn!("Failed to load sprite {}: {}", file_path, e),
        },
        DumpEntry::MapScene { frame } => match load_sprite_from_bytes(contents) {
            Ok(sprite) if !sprite.is_empty() => map.assets.add_map_scene(frame, sprite),
            Ok(_) => log::debug!("Skipping empty map scene {}", file_path),
            Err(e) => log::warn!("Failed to load map scene {}: {}", file_path, e),
        },
    }
    Ok(())
}

/// Parse a JSON array of records, skipping the whole file with a warning if it is malformed.
fn parse_table<T: DeserializeOwned>(file_path: &str, contents: &[u8]) -> Vec<T> {
    match serde_json::from_slice::<Vec<T>>(contents) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Failed to parse {}: {}", file_path, e);
            Vec::new()
        }
    }
}

fn log_summary(map: &MapData) {
    log::info!(
        "Loaded {} underlays, {} overlays, {} objects, {} areas, {} sprites, {} map scenes, {} regions, {} world maps",
        map.assets.underlays.len(),
        map.assets.overlays.len(),
        map.assets.objects.len(),
        map.assets.areas.len(),
        map.assets.sprites.len(),
        map.assets.map_scenes.len(),
        map.regions.len(),
        map.world_maps.len()
    );
}
