//! The region compositor: terrain, overlays, object silhouettes.

use super::blur::{compose_floor, floor_blur};
use super::canvas::Canvas;
use super::objects::{draw_wall, is_visible, map_scene_size, TileCell};
use super::{RenderConfig, RenderContext, MAX_SCALE};
use crate::assets::{LookupKind, LookupStats, SpriteData};
use crate::color::{BlendEngine, ColorPalette, TilePaint};
use crate::region::Region;
use crate::types::{LocationKind, PLANES, REGION_SIZE};
use std::collections::HashMap;

/// Draws regions at one scale.
///
/// A renderer only reads shared tables, so one instance can be used from
/// several threads, each drawing into its own canvas.
pub struct Renderer<'a> {
    ctx: RenderContext<'a>,
    config: RenderConfig,
    palette: ColorPalette,
    /// Map-scene sprites pre-scaled for this renderer's scale.
    map_scenes: HashMap<i32, SpriteData>,
    stats: LookupStats,
}

impl<'a> Renderer<'a> {
    pub fn new(ctx: RenderContext<'a>, config: RenderConfig) -> Self {
        let config = RenderConfig {
            scale: config.scale.clamp(1, MAX_SCALE),
            ..config
        };
        let (width, height) = map_scene_size(config.scale);
        let map_scenes = ctx
            .assets
            .map_scenes
            .iter()
            .map(|(&id, sprite)| (id, sprite.scaled(width, height)))
            .collect();

        Self {
            ctx,
            palette: ColorPalette::new(config.brightness),
            config,
            map_scenes,
            stats: LookupStats::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn context(&self) -> RenderContext<'a> {
        self.ctx
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// Lookup misses recorded by every draw so far.
    pub fn stats(&self) -> &LookupStats {
        &self.stats
    }

    pub fn scale(&self) -> u32 {
        self.config.scale
    }

    /// Edge length of one rendered region in pixels.
    pub fn region_pixels(&self) -> u32 {
        REGION_SIZE as u32 * self.config.scale
    }

    /// Render one region at one plane into a new canvas.
    ///
    /// An absent region yields a blank canvas.
    pub fn render_region(&self, region: Option<&Region>, plane: usize, transparent: bool) -> Canvas {
        let size = self.region_pixels();
        let mut canvas = Canvas::with_background(size, size, transparent);
        if let Some(region) = region {
            self.draw_region(&mut canvas, region, plane, 0, 0);
        }
        canvas
    }

    /// Render a plane over the blurred ground floor. Plane 0 is rendered as is.
    pub fn render_with_background(&self, region: Option<&Region>, plane: usize) -> Canvas {
        let ground = self.render_region(region, 0, false);
        if plane == 0 {
            return ground;
        }
        let floor = self.render_region(region, plane, true);
        compose_floor(&floor_blur(&ground), &floor)
    }

    /// Draw a region onto an existing canvas with its top-left corner at (x, y).
    pub fn draw_region(&self, canvas: &mut Canvas, region: &Region, plane: usize, x: i64, y: i64) {
        let plane = plane.min(PLANES - 1);
        self.draw_terrain(canvas, region, plane, x, y);
        if self.config.draw_objects {
            self.draw_objects(canvas, region, plane, x, y);
        }
    }

    fn cell(&self, x: i64, y: i64, local_x: i32, local_y: i32) -> TileCell {
        let scale = self.config.scale as i64;
        TileCell::new(
            x + local_x as i64 * scale,
            y + (REGION_SIZE - 1 - local_y) as i64 * scale,
            self.config.scale,
        )
    }

    fn draw_terrain(&self, canvas: &mut Canvas, region: &Region, plane: usize, x: i64, y: i64) {
        let engine = BlendEngine::new(
            self.ctx.assets,
            self.ctx.regions,
            &self.palette,
            &self.stats,
            self.config.blend_radius,
        );

        let current = engine.blend_plane(region, plane);
        let has_bridge = (0..REGION_SIZE)
            .any(|ty| (0..REGION_SIZE).any(|tx| region.is_bridge(tx, ty)));
        let above = if has_bridge && plane + 1 < PLANES {
            Some(engine.blend_plane(region, plane + 1))
        } else {
            None
        };

        for ty in 0..REGION_SIZE {
            for tx in 0..REGION_SIZE {
                let paint = if region.is_bridge(tx, ty) {
                    // no plane above the top one
                    match &above {
                        Some(above) => above.get(tx, ty),
                        None => continue,
                    }
                } else if region.is_hidden(plane, tx, ty) {
                    continue;
                } else {
                    current.get(tx, ty)
                };
                self.draw_tile(canvas, self.cell(x, y, tx, ty), paint);
            }
        }
    }

    fn draw_tile(&self, canvas: &mut Canvas, cell: TileCell, paint: TilePaint) {
        let size = self.config.scale;
        let underlay = paint.underlay.map(|rgb| rgb | 0xFF000000);

        let Some(overlay) = paint.overlay else {
            if let Some(argb) = underlay {
                canvas.fill_rect(cell.x, cell.y, size, size, argb);
            }
            return;
        };

        let overlay_argb = overlay.color.map(|rgb| rgb | 0xFF000000);
        if overlay.shape == 1 {
            if let Some(argb) = overlay_argb {
                canvas.fill_rect(cell.x, cell.y, size, size, argb);
            }
            return;
        }

        for py in 0..size {
            for px in 0..size {
                let covered = self.ctx.shapes.covers(
                    size,
                    overlay.shape as usize,
                    overlay.rotation as usize,
                    px,
                    py,
                );
                let argb = if covered { overlay_argb } else { underlay };
                if let Some(argb) = argb {
                    canvas.set(cell.x + px as i64, cell.y + py as i64, argb);
                }
            }
        }
    }

    fn draw_objects(&self, canvas: &mut Canvas, region: &Region, plane: usize, x: i64, y: i64) {
        let colors = (self.config.wall_color, self.config.door_color);
        let mut scenes = Vec::new();

        for location in &region.locations {
            let local_x = location.position.x - region.base_x();
            let local_y = location.position.y - region.base_y();
            if !(0..REGION_SIZE).contains(&local_x) || !(0..REGION_SIZE).contains(&local_y) {
                continue;
            }
            if location.kind() == LocationKind::Other || !is_visible(region, location, plane) {
                continue;
            }
            let Some(object) = self.stats.track(
                LookupKind::Object,
                location.id,
                self.ctx.assets.object(location.id),
            ) else {
                continue;
            };

            let cell = self.cell(x, y, local_x, local_y);
            if object.map_scene_id != -1 {
                scenes.push((cell, object.map_scene_id));
                continue;
            }
            if !draw_wall(canvas, cell, location, object, local_x, local_y, colors) {
                log::trace!(
                    "No stroke for object {} type {} at ({}, {})",
                    location.id,
                    location.type_code,
                    location.position.x,
                    location.position.y
                );
            }
        }

        if !self.config.draw_map_scenes {
            return;
        }
        // sprites start at their tile's corner and overhang right and down
        for (cell, scene_id) in scenes {
            if let Some(sprite) =
                self.stats
                    .track(LookupKind::MapScene, scene_id, self.map_scenes.get(&scene_id))
            {
                canvas.draw_sprite(sprite, cell.x, cell.y);
            }
        }
    }
}
