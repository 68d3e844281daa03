//! Horizontal facing directions and the quarter-turn rotation they imply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cardinal horizontal direction.
///
/// North is -Z, south is +Z, east is +X, west is -X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// -Z.
    North,
    /// +Z. Structures are authored facing south, so this is the identity rotation.
    #[default]
    South,
    /// +X.
    East,
    /// -X.
    West,
}

impl Facing {
    /// All facings in a fixed order.
    pub const ALL: [Facing; 4] = [Facing::North, Facing::South, Facing::East, Facing::West];

    /// Horizontal direction for a yaw angle in degrees (0° = south, 90° = west,
    /// 180° = north, 270° = east).
    pub fn from_yaw(yaw_degrees: f32) -> Self {
        let quarter = (yaw_degrees / 90.0 + 0.5).floor() as i64;
        match quarter.rem_euclid(4) {
            0 => Facing::South,
            1 => Facing::West,
            2 => Facing::North,
            _ => Facing::East,
        }
    }

    /// Rotate a structure-relative `(dx, dz)` offset so the structure's +Z
    /// points along this facing.
    pub const fn rotate_offset(self, dx: i32, dz: i32) -> (i32, i32) {
        match self {
            Facing::South => (dx, dz),
            Facing::North => (dx.saturating_neg(), dz.saturating_neg()),
            Facing::East => (dz, dx.saturating_neg()),
            Facing::West => (dz.saturating_neg(), dx),
        }
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Facing::North => "north",
            Facing::South => "south",
            Facing::East => "east",
            Facing::West => "west",
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Facing::North),
            "south" | "s" => Ok(Facing::South),
            "east" | "e" => Ok(Facing::East),
            "west" | "w" => Ok(Facing::West),
            other => Err(format!("unknown facing: {other}")),
        }
    }
}
