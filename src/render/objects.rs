//! Object silhouettes: wall strokes, corner posts, diagonal walls and
//! map-scene sprites.

use super::canvas::Canvas;
use crate::assets::ObjectDefinition;
use crate::region::Region;
use crate::types::{Location, LocationKind, Orientation};

/// Deterministic wall/door hash of a placed object.
///
/// Mirrors the game's scene hash: tile coordinates in the low bits, the
/// object id above them and a type marker on top. Definitions with
/// `wall_or_door == 0` have the sign bit flipped.
pub fn wall_door_hash(local_x: i32, local_y: i32, object_id: i32, wall_or_door: i32) -> i32 {
    let hash = (local_y << 7)
        .wrapping_add(local_x)
        .wrapping_add(object_id.wrapping_shl(14))
        .wrapping_add(0x40000000);
    if wall_or_door == 0 {
        hash.wrapping_sub(i32::MIN)
    } else {
        hash
    }
}

/// Whether a hash marks a door rather than a wall.
pub fn is_door(hash: i32) -> bool {
    hash > 0
}

/// Whether a diagonal wall with this hash is drawn on the map.
pub fn draws_diagonal(hash: i32) -> bool {
    (hash >> 29) & 3 == 2
}

/// Whether a location is drawn when rendering `plane`.
///
/// Objects one plane up show through bridge tiles; objects on the plane
/// itself are hidden on bridge and blocked tiles.
pub fn is_visible(region: &Region, location: &Location, plane: usize) -> bool {
    let local_x = location.position.x - region.base_x();
    let local_y = location.position.y - region.base_y();
    let z = location.position.z;
    let plane = plane as i32;

    if z == plane + 1 {
        region.is_bridge(local_x, local_y)
    } else if z == plane {
        !region.is_bridge(local_x, local_y) && !region.is_hidden(plane as usize, local_x, local_y)
    } else {
        false
    }
}

/// Pixel-space cell of one tile inside a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCell {
    /// Left pixel column.
    pub x: i64,
    /// Top pixel row.
    pub y: i64,
    /// Edge length in pixels.
    pub size: i64,
}

impl TileCell {
    pub fn new(x: i64, y: i64, size: u32) -> Self {
        Self {
            x,
            y,
            size: size as i64,
        }
    }
}

/// Draw a one-pixel stroke along a tile edge.
pub fn draw_edge(canvas: &mut Canvas, cell: TileCell, edge: Orientation, argb: u32) {
    let last = cell.size - 1;
    for i in 0..cell.size {
        let (dx, dy) = match edge {
            Orientation::West => (0, i),
            Orientation::North => (i, 0),
            Orientation::East => (last, i),
            Orientation::South => (i, last),
        };
        canvas.set(cell.x + dx, cell.y + dy, argb);
    }
}

/// Draw a single corner pixel; corners follow the orientation clockwise from top-left.
pub fn draw_corner(canvas: &mut Canvas, cell: TileCell, corner: Orientation, argb: u32) {
    let last = cell.size - 1;
    let (dx, dy) = match corner {
        Orientation::West => (0, 0),
        Orientation::North => (last, 0),
        Orientation::East => (last, last),
        Orientation::South => (0, last),
    };
    canvas.set(cell.x + dx, cell.y + dy, argb);
}

/// Draw a diagonal stroke across the cell.
pub fn draw_diagonal(canvas: &mut Canvas, cell: TileCell, facing: Orientation, argb: u32) {
    let last = cell.size - 1;
    for i in 0..cell.size {
        if facing.is_descending_diagonal() {
            canvas.set(cell.x + i, cell.y + i, argb);
        } else {
            canvas.set(cell.x + i, cell.y + last - i, argb);
        }
    }
}

/// Draw the procedural silhouette of a wall-like location.
///
/// Returns `false` when the location kind has no procedural silhouette.
pub fn draw_wall(
    canvas: &mut Canvas,
    cell: TileCell,
    location: &Location,
    object: &ObjectDefinition,
    local_x: i32,
    local_y: i32,
    colors: (u32, u32),
) -> bool {
    let hash = wall_door_hash(local_x, local_y, location.id, object.wall_or_door);
    let argb = if is_door(hash) { colors.1 } else { colors.0 };
    let facing = location.facing();

    match location.kind() {
        LocationKind::Wall(0) => draw_edge(canvas, cell, facing, argb),
        LocationKind::Wall(2) => {
            draw_edge(canvas, cell, facing, argb);
            draw_edge(canvas, cell, facing.clockwise(), argb);
        }
        LocationKind::Wall(3) => draw_corner(canvas, cell, facing, argb),
        LocationKind::DiagonalWall if draws_diagonal(hash) => {
            draw_diagonal(canvas, cell, facing, argb)
        }
        _ => return false,
    }
    true
}

/// Pixel size of a map-scene sprite at the given scale.
pub fn map_scene_size(scale: u32) -> (u32, u32) {
    (scale + (3 * scale).div_ceil(4), 2 * scale)
}
