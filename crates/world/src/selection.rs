//! Two-click corner selection used to carve new regions out of the world.

use std::collections::HashMap;

use thiserror::Error;
use tracing::info;
use voidworld_core::{ActorId, BlockPos, RegistryKey};

use crate::host::MessageSink;
use crate::location::{GameLocation, LocationType};
use crate::location_registry::LocationRegistry;

/// Reasons [`BoundarySelector::create`] refuses to build a region.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Both corners have not been marked yet.
    #[error("No selection! Mark both corners first.")]
    NoSelection,
    /// The type string names no region type.
    #[error("Invalid type: {given}. Valid types: {valid}")]
    UnknownType {
        /// What the caller supplied.
        given: String,
        /// Comma-separated list of accepted names.
        valid: String,
    },
    /// The ID is not a valid registry key.
    #[error("Invalid location id: {0}")]
    InvalidId(String),
}

/// Corners marked so far by one actor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    /// First marked corner.
    pub corner1: Option<BlockPos>,
    /// Second marked corner.
    pub corner2: Option<BlockPos>,
}

impl SelectionState {
    /// Both corners, when the selection is complete.
    pub fn corners(&self) -> Option<(BlockPos, BlockPos)> {
        self.corner1.zip(self.corner2)
    }

    /// Normalized `(min, max)` of a complete selection.
    pub fn bounds(&self) -> Option<(BlockPos, BlockPos)> {
        self.corners().map(|(a, b)| (a.min(b), a.max(b)))
    }
}

/// Result of one boundary-select action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// A new selection was started.
    Corner1(BlockPos),
    /// The selection was completed.
    Completed {
        /// First raw corner.
        corner1: BlockPos,
        /// Second raw corner.
        corner2: BlockPos,
        /// Per-axis minimum.
        min: BlockPos,
        /// Per-axis maximum.
        max: BlockPos,
        /// Edge lengths `(x, y, z)` in blocks.
        size: (u32, u32, u32),
        /// Block count.
        volume: u64,
    },
}

/// Per-actor selection state machine.
#[derive(Debug, Default)]
pub struct BoundarySelector {
    selections: HashMap<ActorId, SelectionState>,
}

impl BoundarySelector {
    /// No selections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for `actor`.
    pub fn selection(&self, actor: ActorId) -> Option<&SelectionState> {
        self.selections.get(&actor)
    }

    /// Forget `actor`'s selection.
    pub fn clear(&mut self, actor: ActorId) {
        self.selections.remove(&actor);
    }

    /// Forget every selection.
    pub fn clear_all(&mut self) {
        self.selections.clear();
    }

    /// Apply one boundary-select action at `pos` and echo the result to the actor.
    ///
    /// Starts a new selection when none is in progress or the previous one
    /// is already complete; otherwise completes it.
    pub fn mark(&mut self, actor: ActorId, pos: BlockPos, sink: &mut dyn MessageSink) -> MarkOutcome {
        let state = self.selections.entry(actor).or_default();

        let corner1 = match (state.corner1, state.corner2) {
            (Some(corner1), None) => corner1,
            _ => {
                *state = SelectionState {
                    corner1: Some(pos),
                    corner2: None,
                };
                sink.chat(actor, &format!("Corner 1 set: {pos}"));
                return MarkOutcome::Corner1(pos);
            }
        };

        state.corner2 = Some(pos);
        let min = corner1.min(pos);
        let max = corner1.max(pos);
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1) as u32;
        let size = (span(min.x, max.x), span(min.y, max.y), span(min.z, max.z));
        let volume = u64::from(size.0) * u64::from(size.1) * u64::from(size.2);

        sink.chat(actor, &format!("Corner 2 set: {pos}"));
        sink.chat(
            actor,
            &format!("Selection: {}x{}x{} blocks ({volume} total)", size.0, size.1, size.2),
        );

        MarkOutcome::Completed {
            corner1,
            corner2: pos,
            min,
            max,
            size,
            volume,
        }
    }

    /// Build and register a region from `actor`'s completed selection.
    ///
    /// The selection survives failures so the actor can retry with a
    /// corrected ID or type.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        actor: ActorId,
        registry: &mut LocationRegistry,
        id: &str,
        type_name: &str,
        name_key: Option<&str>,
        dimension: &RegistryKey,
        actor_pos: BlockPos,
        sink: &mut dyn MessageSink,
    ) -> Result<RegistryKey, SelectionError> {
        let result = self.build(actor, id, type_name, name_key, dimension, actor_pos);
        let location = match result {
            Ok(location) => location,
            Err(err) => {
                sink.chat(actor, &err.to_string());
                return Err(err);
            }
        };

        let key = location.id.clone();
        let (min, max) = (location.min, location.max);
        info!(id = %key, kind = %location.kind, %min, %max, "created location from selection");
        registry.register(location);
        self.selections.remove(&actor);

        sink.chat(actor, &format!("Location created: {key}"));
        sink.chat(actor, &format!("Bounds: {min} to {max}"));
        Ok(key)
    }

    fn build(
        &self,
        actor: ActorId,
        id: &str,
        type_name: &str,
        name_key: Option<&str>,
        dimension: &RegistryKey,
        actor_pos: BlockPos,
    ) -> Result<GameLocation, SelectionError> {
        let (corner1, corner2) = self
            .selections
            .get(&actor)
            .and_then(SelectionState::corners)
            .ok_or(SelectionError::NoSelection)?;

        let kind: LocationType = type_name.parse().map_err(|_| SelectionError::UnknownType {
            given: type_name.to_string(),
            valid: LocationType::valid_names(),
        })?;

        let key = RegistryKey::parse(id).map_err(|_| SelectionError::InvalidId(id.to_string()))?;

        let mut location = GameLocation::new(key, dimension.clone(), corner1, corner2, kind);
        if let Some(name_key) = name_key.filter(|n| !n.trim().is_empty()) {
            location.name_key = name_key.trim().to_string();
        }
        location.spawn_point = Some(actor_pos);
        Ok(location)
    }
}
