//! Shared types used throughout the library.

mod orientation;

pub use orientation::Orientation;

use serde::{Deserialize, Serialize};

/// Number of tiles along each edge of a region.
pub const REGION_SIZE: i32 = 64;

/// Number of planes (floor levels) in the world.
pub const PLANES: usize = 4;

/// A position in world tile space, with the plane as `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Get the coordinates of the region containing this position.
    pub fn region(&self) -> RegionCoord {
        RegionCoord::new(self.x.div_euclid(REGION_SIZE), self.y.div_euclid(REGION_SIZE))
    }
}

/// Coordinates of a region on the region grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct RegionCoord {
    pub x: i32,
    pub y: i32,
}

impl RegionCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World x coordinate of the region's south-west tile.
    pub fn base_x(&self) -> i32 {
        self.x * REGION_SIZE
    }

    /// World y coordinate of the region's south-west tile.
    pub fn base_y(&self) -> i32 {
        self.y * REGION_SIZE
    }

    /// Packed region id as used by the game (`x << 8 | y`).
    pub fn id(&self) -> i32 {
        (self.x << 8) | self.y
    }
}

/// How a placed object is drawn, derived from its structural type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// Straight wall segment (0), wall corner piece (1), L-shaped wall (2) or corner post (3).
    Wall(u8),
    /// Diagonal wall (9).
    DiagonalWall,
    /// Ground decoration or interactive ground object (10, 11, 22).
    GroundObject,
    /// Anything else; never drawn on the map.
    Other,
}

impl LocationKind {
    /// Classify a raw type code.
    pub fn from_type(code: u8) -> Self {
        match code {
            0..=3 => LocationKind::Wall(code),
            9 => LocationKind::DiagonalWall,
            10 | 11 | 22 => LocationKind::GroundObject,
            _ => LocationKind::Other,
        }
    }
}

/// An object placed in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Object definition id.
    pub id: i32,
    /// World position; `z` is the plane.
    pub position: Position,
    /// Raw orientation (0-3).
    #[serde(default)]
    pub orientation: u8,
    /// Structural type code.
    #[serde(rename = "type")]
    pub type_code: u8,
}

impl Location {
    pub fn new(id: i32, position: Position, type_code: u8, orientation: u8) -> Self {
        Self {
            id,
            position,
            orientation,
            type_code,
        }
    }

    /// Get the drawing classification of this location.
    pub fn kind(&self) -> LocationKind {
        LocationKind::from_type(self.type_code)
    }

    /// Get the orientation as an enum.
    pub fn facing(&self) -> Orientation {
        Orientation::from_raw(self.orientation)
    }
}
