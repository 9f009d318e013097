//! World Map Tiler CLI
//!
//! Render world-map tiles and feature files from a map dump.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use world_map_tiler::export::{
    write_json_file, BaseMapsFile, ChunkPosition, ChunkPositionFile, FeatureCollection, ItemList,
    MapChunks,
};
use world_map_tiler::types::PLANES;
use world_map_tiler::{
    load_map_data, DirectorySink, FeatureExporter, LookupStats, MapData, MapTileExporter,
    RenderConfig, RenderContext, Renderer, TileExportConfig, TileShapes, WorldMapDefinition,
    WorldStitcher,
};

#[derive(Parser)]
#[command(name = "world-map-tiler")]
#[command(author, version, about = "Render world-map tiles and features from a map dump", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export PNG tiles for one or all world maps
    Render {
        /// Path to the map dump (ZIP or directory)
        #[arg(short, long)]
        dump: PathBuf,

        /// Directory holding the tile shape masks 00.png..12.png
        #[arg(short, long)]
        shapes: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with a tile export configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only export this map id
        #[arg(short, long)]
        map: Option<i32>,

        /// Lowest zoom layer (2^layer pixels per tile)
        #[arg(long)]
        min_layer: Option<u32>,

        /// Highest zoom layer
        #[arg(long)]
        max_layer: Option<u32>,

        /// Suffix appended to the map id in output folder names
        #[arg(long)]
        cache_version: Option<String>,

        /// Name tiles by their remapped position
        #[arg(long)]
        move_tiles: bool,

        /// Draw upper planes without the blurred ground floor
        #[arg(long)]
        no_floor_background: bool,
    },

    /// Draw regions into a single PNG
    Stitch {
        /// Path to the map dump (ZIP or directory)
        #[arg(short, long)]
        dump: PathBuf,

        /// Directory holding the tile shape masks 00.png..12.png
        #[arg(short, long)]
        shapes: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Only draw regions this map contains
        #[arg(short, long)]
        map: Option<i32>,

        /// Plane to draw
        #[arg(short, long, default_value = "0")]
        plane: usize,

        /// Pixels per tile edge
        #[arg(long, default_value = "4")]
        scale: u32,

        /// Leave empty space transparent
        #[arg(long)]
        transparent: bool,

        /// Skip walls, doors and map scenes
        #[arg(long)]
        no_objects: bool,
    },

    /// Export icon, label, object, chunk and base-map files
    Features {
        /// Path to the map dump (ZIP or directory)
        #[arg(short, long)]
        dump: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Only export this map id
        #[arg(short, long)]
        map: Option<i32>,

        /// Cache version written into the base-map list
        #[arg(long, default_value = "")]
        cache_version: String,
    },

    /// Show map dump information
    Info {
        /// Path to the map dump (ZIP or directory)
        #[arg(short, long)]
        dump: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            dump,
            shapes,
            output,
            config,
            map,
            min_layer,
            max_layer,
            cache_version,
            move_tiles,
            no_floor_background,
        } => {
            let mut config = match config {
                Some(path) => TileExportConfig::load(&path)?,
                None => TileExportConfig::default(),
            };
            if min_layer.is_some() || max_layer.is_some() {
                let min = min_layer.unwrap_or(config.min_layer);
                let max = max_layer.unwrap_or(config.max_layer);
                config = config.with_layers(min, max);
            }
            if let Some(cache_version) = cache_version {
                config = config.with_cache_version(cache_version);
            }
            if move_tiles {
                config = config.with_move_tiles(true);
            }
            if no_floor_background {
                config = config.with_floor_background(false);
            }
            render_tiles(&dump, &shapes, &output, config, map)?;
        }
        Commands::Stitch {
            dump,
            shapes,
            output,
            map,
            plane,
            scale,
            transparent,
            no_objects,
        } => {
            let config = RenderConfig::default()
                .with_scale(scale)
                .with_objects(!no_objects)
                .with_map_scenes(!no_objects);
            stitch_world(&dump, &shapes, &output, map, plane, transparent, config)?;
        }
        Commands::Features {
            dump,
            output,
            map,
            cache_version,
        } => {
            export_features(&dump, &output, map, &cache_version)?;
        }
        Commands::Info { dump } => {
            show_dump_info(&dump)?;
        }
    }

    Ok(())
}

fn load_dump(path: &Path) -> Result<MapData, Box<dyn std::error::Error>> {
    println!("Loading map dump from {:?}...", path);
    let data = load_map_data(path)?;
    println!(
        "  Found {} regions, {} definitions, {} world maps",
        data.regions.len(),
        data.assets.definition_count(),
        data.world_maps.len()
    );
    Ok(data)
}

fn select_maps(
    data: &MapData,
    map: Option<i32>,
) -> Result<Vec<&WorldMapDefinition>, Box<dyn std::error::Error>> {
    match map {
        Some(id) => match data.world_map(id) {
            Some(def) => Ok(vec![def]),
            None => Err(format!("World map {} not found in dump", id).into()),
        },
        None => Ok(data.world_maps.iter().collect()),
    }
}

fn render_tiles(
    dump: &Path,
    shapes_dir: &Path,
    output: &Path,
    config: TileExportConfig,
    map: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_dump(dump)?;
    let shapes = TileShapes::load_from_dir(shapes_dir)?;
    let maps = select_maps(&data, map)?;

    println!("Rendering with config:");
    println!("  - Layers: {}..={}", config.min_layer, config.max_layer);
    println!("  - Planes: {}..={}", config.min_plane, config.max_plane);
    println!("  - Move tiles: {}", config.move_tiles);
    println!("  - Floor background: {}", config.floor_background);

    let ctx = RenderContext::new(&data.assets, &data.regions, &shapes);
    let exporter = MapTileExporter::new(ctx, config);
    let mut sink = DirectorySink::new(output);

    let mut failed = 0;
    for (id, summary) in exporter.export_maps(maps, &mut sink)? {
        println!(
            "  Map {}: {} tiles, {} chunks, {} failed ({})",
            id,
            summary.tiles_written,
            summary.chunks.len(),
            summary.failed,
            summary.lookups
        );
        failed += summary.failed;
    }

    if failed > 0 {
        return Err(format!("{} tiles failed to export", failed).into());
    }
    Ok(())
}

fn stitch_world(
    dump: &Path,
    shapes_dir: &Path,
    output: &Path,
    map: Option<i32>,
    plane: usize,
    transparent: bool,
    config: RenderConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if plane >= PLANES {
        return Err(format!("Plane {} out of range 0..{}", plane, PLANES).into());
    }
    let data = load_dump(dump)?;
    let shapes = TileShapes::load_from_dir(shapes_dir)?;

    let ctx = RenderContext::new(&data.assets, &data.regions, &shapes);
    let renderer = Renderer::new(ctx, config);
    let stitcher = WorldStitcher::new(&renderer);

    let canvas = match map {
        Some(id) => {
            let def = data
                .world_map(id)
                .ok_or_else(|| format!("World map {} not found in dump", id))?;
            let regions = data
                .regions
                .coords_sorted()
                .into_iter()
                .filter(|c| def.contains(c.x, c.y, plane as i32))
                .filter_map(|c| data.regions.get(c));
            stitcher.stitch(regions, plane, transparent)
        }
        None => stitcher.stitch_all(plane, transparent),
    };

    let png = canvas.to_png()?;
    fs::write(output, &png)?;
    println!(
        "Exported {}x{} canvas ({} bytes) to {:?}",
        canvas.width(),
        canvas.height(),
        png.len(),
        output
    );

    let lookups = renderer.stats().summary();
    if !lookups.is_empty() {
        println!("  {}", lookups);
    }
    Ok(())
}

fn export_features(
    dump: &Path,
    output: &Path,
    map: Option<i32>,
    cache_version: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_dump(dump)?;
    let maps = select_maps(&data, map)?;
    if maps.is_empty() {
        println!("No world maps in dump, nothing to export");
        return Ok(());
    }

    let stats = LookupStats::new();
    let exporter = FeatureExporter::new(&data.assets, &stats);

    let mut chunk_file = ChunkPositionFile::default();
    let mut base_maps = BaseMapsFile::default();

    for def in maps {
        let features = exporter.collect(&data.regions, Some(def), 0..=PLANES - 1);
        let dir = output.join(def.id.to_string());

        let icons: Vec<_> = features.icons.iter().map(|i| i.to_geojson(def.id)).collect();
        write_json_file(&dir.join("icons.json"), &FeatureCollection::new(icons))?;
        write_json_file(&dir.join("labels.json"), &ItemList { items: features.labels })?;
        write_json_file(&dir.join("objects.json"), &ItemList { items: features.objects })?;

        let mut chunks = Vec::new();
        for z in 0..PLANES as i32 {
            for coord in data.regions.coords_sorted() {
                if def.contains(coord.x, coord.y, z) {
                    chunks.push(ChunkPosition {
                        x: coord.x,
                        y: coord.y,
                        z,
                    });
                }
            }
        }
        println!("  Map {} ({}): {} chunks", def.id, def.name, chunks.len());
        chunk_file.chunk_pos.push(MapChunks {
            map_id: def.id,
            name: def.name.clone(),
            chunks,
        });
        base_maps.base_maps.push(def.base_map_entry(cache_version));
    }

    write_json_file(&output.join("chunks.json"), &chunk_file)?;
    write_json_file(&output.join("basemaps.json"), &base_maps)?;

    let lookups = stats.summary();
    if !lookups.is_empty() {
        println!("  {}", lookups);
    }
    Ok(())
}

fn show_dump_info(dump: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_dump(dump)?;
    let assets = &data.assets;

    println!("\nMap Dump Info:");
    println!("  Underlays: {}", assets.underlays.len());
    println!("  Overlays: {}", assets.overlays.len());
    println!("  Objects: {}", assets.objects.len());
    println!("  Areas: {}", assets.areas.len());
    println!("  Textures: {}", assets.texture_colors.len());
    println!("  Sprites: {}", assets.sprites.len());
    println!("  Map scenes: {}", assets.map_scenes.len());
    println!("  Regions: {}", data.regions.len());
    if let Some(bounds) = data.regions.bounds() {
        println!(
            "  Region bounds: ({}, {}) to ({}, {})",
            bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
        );
    }
    for def in &data.world_maps {
        println!("  Map {}: {} ({} rules)", def.id, def.name, def.rules.len());
    }

    Ok(())
}
