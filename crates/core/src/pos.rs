//! Integer block coordinates and the chunk partition used for spatial indexing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Horizontal chunk edge length in blocks (16 × 16 columns).
pub const CHUNK_SHIFT: u32 = 4;

/// Absolute block position in a dimension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// East/west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North/south axis.
    pub z: i32,
}

impl BlockPos {
    /// The world origin.
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    /// Construct a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Translate by the supplied deltas, clamping at the `i32` range.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// Translate by the supplied deltas, or `None` if any axis leaves the `i32` range.
    pub const fn checked_offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        match (
            self.x.checked_add(dx),
            self.y.checked_add(dy),
            self.z.checked_add(dz),
        ) {
            (Some(x), Some(y), Some(z)) => Some(Self::new(x, y, z)),
            _ => None,
        }
    }

    /// Position `n` blocks above this one.
    pub const fn above(self, n: i32) -> Self {
        self.offset(0, n, 0)
    }

    /// Per-axis minimum of two positions.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Per-axis maximum of two positions.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Chunk column containing this position.
    pub const fn chunk(self) -> ChunkCoord {
        ChunkCoord::new(self.x >> CHUNK_SHIFT, self.z >> CHUNK_SHIFT)
    }
}

impl Add for BlockPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.offset(rhs.x, rhs.y, rhs.z)
    }
}

impl Sub for BlockPos {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.offset(-rhs.x, -rhs.y, -rhs.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Chunk column coordinate (block coordinate shifted right by 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk x.
    pub x: i32,
    /// Chunk z.
    pub z: i32,
}

impl ChunkCoord {
    /// Construct a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Packed 64-bit index key for this chunk.
    pub const fn key(self) -> u64 {
        chunk_key(self.x, self.z)
    }
}

/// Pack a chunk coordinate pair into one 64-bit key: low 32 bits hold `cx`,
/// high 32 bits hold `cz`, both as raw two's-complement words.
pub const fn chunk_key(cx: i32, cz: i32) -> u64 {
    (cx as u32 as u64) | ((cz as u32 as u64) << 32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn chunk_uses_floor_division() {
        assert_eq!(BlockPos::new(0, 64, 0).chunk(), ChunkCoord::new(0, 0));
        assert_eq!(BlockPos::new(15, 0, 15).chunk(), ChunkCoord::new(0, 0));
        assert_eq!(BlockPos::new(16, 0, -1).chunk(), ChunkCoord::new(1, -1));
        assert_eq!(BlockPos::new(-16, 0, -17).chunk(), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn offsets_at_the_range_edge() {
        let edge = BlockPos::new(i32::MAX, 0, i32::MIN);
        assert_eq!(edge.checked_offset(1, 0, 0), None);
        assert_eq!(edge.checked_offset(0, 0, -1), None);
        assert_eq!(edge.checked_offset(-1, 2, 1), Some(BlockPos::new(i32::MAX - 1, 2, i32::MIN + 1)));
        assert_eq!(edge.offset(1, 0, -1), edge);
    }

    #[test]
    fn chunk_key_keeps_negative_halves_apart() {
        assert_ne!(chunk_key(-1, 0), chunk_key(0, -1));
        assert_eq!(chunk_key(-1, 0), 0x0000_0000_FFFF_FFFF);
        assert_eq!(chunk_key(0, -1), 0xFFFF_FFFF_0000_0000);
    }

    #[test]
    fn min_max_are_per_axis() {
        let a = BlockPos::new(5, 5, 5);
        let b = BlockPos::new(1, 10, 2);
        assert_eq!(a.min(b), BlockPos::new(1, 5, 2));
        assert_eq!(a.max(b), BlockPos::new(5, 10, 5));
    }

    proptest! {
        #[test]
        fn chunk_key_is_injective(a in any::<(i32, i32)>(), b in any::<(i32, i32)>()) {
            prop_assert_eq!(chunk_key(a.0, a.1) == chunk_key(b.0, b.1), a == b);
        }
    }
}
