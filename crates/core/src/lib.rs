#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod facing;
pub mod pos;
pub mod registry;

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use facing::Facing;
pub use pos::{chunk_key, BlockPos, ChunkCoord};
pub use registry::{RegistryKey, RegistryKeyError, DEFAULT_NAMESPACE};

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Stable identity of an actor (player or scripted agent) driving tracking,
/// selection and undo state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}
