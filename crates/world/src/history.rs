//! Per-actor LIFO history of structure placements and undo.

use std::collections::HashMap;

use tracing::{debug, warn};
use voidworld_core::{ActorId, BlockPos, RegistryKey};

use crate::host::{BlockCatalog, BlockState, UpdateFlags, WorldAccess};

/// One placement transaction: the non-air positions a structure wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementEntry {
    /// Structure that was placed.
    pub structure_id: String,
    /// Dimension it was placed in.
    pub dimension: RegistryKey,
    /// Positions written, in placement order.
    pub positions: Vec<BlockPos>,
}

/// Undo stacks keyed by actor. Depth is unbounded.
#[derive(Debug, Default)]
pub struct PlacementHistory {
    stacks: HashMap<ActorId, Vec<PlacementEntry>>,
}

impl PlacementHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a placement. Empty position lists are ignored.
    pub fn push(
        &mut self,
        actor: ActorId,
        structure_id: impl Into<String>,
        dimension: RegistryKey,
        positions: Vec<BlockPos>,
    ) {
        if positions.is_empty() {
            return;
        }
        debug!(%actor, blocks = positions.len(), "structure placement recorded");
        self.stacks.entry(actor).or_default().push(PlacementEntry {
            structure_id: structure_id.into(),
            dimension,
            positions,
        });
    }

    /// Remove and return the most recent placement.
    pub fn pop(&mut self, actor: ActorId) -> Option<PlacementEntry> {
        let stack = self.stacks.get_mut(&actor)?;
        let entry = stack.pop();
        if stack.is_empty() {
            self.stacks.remove(&actor);
        }
        entry
    }

    /// Whether `actor` has anything to undo.
    pub fn can_undo(&self, actor: ActorId) -> bool {
        self.depth(actor) > 0
    }

    /// Number of placements on `actor`'s stack.
    pub fn depth(&self, actor: ActorId) -> usize {
        self.stacks.get(&actor).map_or(0, Vec::len)
    }

    /// Pop the latest placement and write air to every recorded position.
    ///
    /// Returns the number of positions cleared; 0 when there was nothing to
    /// undo or the entry's dimension is gone (the entry is consumed either way).
    pub fn undo(&mut self, actor: ActorId, world: &mut dyn WorldAccess, catalog: &dyn BlockCatalog) -> usize {
        let Some(entry) = self.pop(actor) else {
            return 0;
        };
        if !world.has_dimension(&entry.dimension) {
            warn!(%actor, dimension = %entry.dimension, structure = %entry.structure_id, "undo target dimension missing");
            return 0;
        }

        let air = catalog.air();
        for pos in &entry.positions {
            world.set_block(&entry.dimension, *pos, BlockState::of(air), UpdateFlags::ALL);
        }
        debug!(%actor, blocks = entry.positions.len(), structure = %entry.structure_id, "undo removed structure");
        entry.positions.len()
    }

    /// Drop `actor`'s history.
    pub fn clear_actor(&mut self, actor: ActorId) {
        self.stacks.remove(&actor);
    }

    /// Drop every actor's history.
    pub fn clear(&mut self) {
        self.stacks.clear();
    }

    /// `(structure id, block count)` per entry, oldest first.
    pub fn summary(&self, actor: ActorId) -> Vec<(String, usize)> {
        self.stacks
            .get(&actor)
            .map(|stack| {
                stack
                    .iter()
                    .map(|entry| (entry.structure_id.clone(), entry.positions.len()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
