//! Orientation of placed objects on the tile grid.

use serde::{Deserialize, Serialize};

/// The four orientations a placed object can have.
///
/// The raw value stored by the game is 0-3; each names the tile edge a
/// straight wall with that orientation sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    West,
    North,
    East,
    South,
}

impl Orientation {
    /// All four orientations in raw order.
    pub const ALL: [Orientation; 4] = [
        Orientation::West,
        Orientation::North,
        Orientation::East,
        Orientation::South,
    ];

    /// Convert a raw orientation value. Only the low two bits are significant.
    pub fn from_raw(raw: u8) -> Self {
        Self::ALL[(raw & 3) as usize]
    }

    /// Get the raw orientation value (0-3).
    pub fn raw(self) -> u8 {
        match self {
            Orientation::West => 0,
            Orientation::North => 1,
            Orientation::East => 2,
            Orientation::South => 3,
        }
    }

    /// Rotate by 90 degrees clockwise (seen from above, north up).
    pub fn clockwise(self) -> Orientation {
        match self {
            Orientation::West => Orientation::North,
            Orientation::North => Orientation::East,
            Orientation::East => Orientation::South,
            Orientation::South => Orientation::West,
        }
    }

    /// Get the opposite orientation.
    pub fn opposite(self) -> Orientation {
        self.clockwise().clockwise()
    }

    /// Whether a diagonal wall with this orientation runs from the top-left
    /// corner to the bottom-right corner of its tile.
    pub fn is_descending_diagonal(self) -> bool {
        matches!(self, Orientation::North | Orientation::South)
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::West => write!(f, "west"),
            Orientation::North => write!(f, "north"),
            Orientation::East => write!(f, "east"),
            Orientation::South => write!(f, "south"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        for raw in 0..4u8 {
            assert_eq!(Orientation::from_raw(raw).raw(), raw);
        }
        assert_eq!(Orientation::from_raw(5), Orientation::North);
    }

    #[test]
    fn test_clockwise() {
        assert_eq!(Orientation::West.clockwise(), Orientation::North);
        assert_eq!(Orientation::South.clockwise(), Orientation::West);
        assert_eq!(Orientation::East.opposite(), Orientation::West);
    }
}
