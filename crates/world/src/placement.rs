//! Rotated structure placement against a host world.

use tracing::{debug, warn};
use voidworld_core::{BlockPos, Facing, RegistryKey};

use crate::host::{BlockCatalog, BlockState, UpdateFlags, WorldAccess};
use crate::structure::StructureDefinition;

/// Where and how to place a structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
    /// Target dimension.
    pub dimension: RegistryKey,
    /// World position of offset `(0, 0, 0)`.
    pub origin: BlockPos,
    /// Direction the structure's +Z axis is turned to.
    pub facing: Facing,
}

impl PlacementRequest {
    /// Request facing south (no rotation).
    pub fn new(dimension: RegistryKey, origin: BlockPos) -> Self {
        Self {
            dimension,
            origin,
            facing: Facing::South,
        }
    }

    /// Same request turned to `facing`.
    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Absolute position of a structure-relative offset, or `None` when it
    /// falls outside the coordinate range.
    pub fn resolve(&self, (dx, dy, dz): (i32, i32, i32)) -> Option<BlockPos> {
        let (rx, rz) = self.facing.rotate_offset(dx, dz);
        self.origin.checked_offset(rx, dy, rz)
    }
}

/// Aggregate outcome of one placement.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    /// Writes accepted by the host, air included.
    pub written: usize,
    /// Entries skipped because the block did not resolve, the position was out
    /// of range, or the host rejected the write.
    pub skipped: usize,
    /// Non-air positions written, in placement order.
    pub recorded: Vec<BlockPos>,
}

/// Write every entry of `definition` at its rotated position with a full update.
///
/// Unresolvable identifiers are skipped. A request against a dimension the
/// host does not have writes nothing and skips every entry.
pub fn place_structure(
    world: &mut dyn WorldAccess,
    catalog: &dyn BlockCatalog,
    definition: &StructureDefinition,
    request: &PlacementRequest,
) -> PlacementReport {
    let mut report = PlacementReport::default();

    if !world.has_dimension(&request.dimension) {
        warn!(dimension = %request.dimension, structure = %definition.name, "placement into unknown dimension");
        report.skipped = definition.blocks.len();
        return report;
    }

    for entry in &definition.blocks {
        let Some(id) = catalog.resolve(&entry.block) else {
            debug!(block = %entry.block, "unknown block in structure, skipping");
            report.skipped += 1;
            continue;
        };
        let Some(pos) = request.resolve(entry.offset()) else {
            debug!(offset = ?entry.offset(), origin = %request.origin, "structure cell out of range, skipping");
            report.skipped += 1;
            continue;
        };
        let state = match &entry.properties {
            Some(properties) => BlockState::with_properties(id, properties.clone()),
            None => BlockState::of(id),
        };

        if !world.set_block(&request.dimension, pos, state, UpdateFlags::ALL) {
            report.skipped += 1;
            continue;
        }
        report.written += 1;
        if !catalog.is_air(id) {
            report.recorded.push(pos);
        }
    }

    debug!(
        structure = %definition.name,
        origin = %request.origin,
        facing = %request.facing,
        written = report.written,
        skipped = report.skipped,
        "placed structure"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryWorld, NamedBlockCatalog};
    use crate::structure::StructureBlockEntry;

    fn overworld() -> RegistryKey {
        RegistryKey::minecraft("overworld")
    }

    fn definition(blocks: Vec<StructureBlockEntry>) -> StructureDefinition {
        StructureDefinition {
            name: "test".into(),
            blocks,
            block_image: None,
        }
    }

    #[test]
    fn air_entries_are_written_but_not_recorded() {
        let catalog = NamedBlockCatalog::standard();
        let mut world = MemoryWorld::new([overworld()]);
        let stone = catalog.resolve("minecraft:stone").unwrap();
        let origin = BlockPos::new(0, 64, 0);
        world.set_block(&overworld(), origin.offset(0, 1, 0), BlockState::of(stone), UpdateFlags::ALL);

        let def = definition(vec![
            StructureBlockEntry::new("minecraft:stone_bricks", 0, 0, 0),
            StructureBlockEntry::new("minecraft:air", 0, 1, 0),
        ]);
        let report = place_structure(&mut world, &catalog, &def, &PlacementRequest::new(overworld(), origin));

        assert_eq!(report.written, 2);
        assert_eq!(report.recorded, vec![origin]);
        assert_eq!(world.block_at(&overworld(), origin.offset(0, 1, 0)).id, catalog.air());
    }

    #[test]
    fn unknown_blocks_are_skipped() {
        let catalog = NamedBlockCatalog::standard();
        let mut world = MemoryWorld::new([overworld()]);
        let def = definition(vec![
            StructureBlockEntry::new("voidworld:void_crystal", 0, 0, 0),
            StructureBlockEntry::new("minecraft:glass", 1, 0, 0),
        ]);
        let report = place_structure(&mut world, &catalog, &def, &PlacementRequest::new(overworld(), BlockPos::ORIGIN));
        assert_eq!(report.skipped, 1);
        assert_eq!(report.recorded, vec![BlockPos::new(1, 0, 0)]);
    }

    #[test]
    fn properties_reach_the_host() {
        let catalog = NamedBlockCatalog::standard();
        let mut world = MemoryWorld::new([overworld()]);
        let mut entry = StructureBlockEntry::new("minecraft:oak_log", 0, 0, 0);
        entry.properties = Some([("axis".to_string(), "x".to_string())].into_iter().collect());
        place_structure(&mut world, &catalog, &definition(vec![entry]), &PlacementRequest::new(overworld(), BlockPos::ORIGIN));

        let state = world.block_at(&overworld(), BlockPos::ORIGIN);
        assert_eq!(state.properties.get("axis").map(String::as_str), Some("x"));
    }

    #[test]
    fn unknown_dimension_writes_nothing() {
        let catalog = NamedBlockCatalog::standard();
        let mut world = MemoryWorld::new([overworld()]);
        let def = definition(vec![StructureBlockEntry::new("minecraft:stone", 0, 0, 0)]);
        let request = PlacementRequest::new(RegistryKey::voidworld("cosmic_platform"), BlockPos::ORIGIN);
        let report = place_structure(&mut world, &catalog, &def, &request);
        assert_eq!(report.written, 0);
        assert!(report.recorded.is_empty());
    }

    #[test]
    fn east_facing_turns_offsets() {
        let request = PlacementRequest::new(overworld(), BlockPos::new(100, 64, 100)).facing(Facing::East);
        assert_eq!(request.resolve((2, 1, 5)), Some(BlockPos::new(105, 65, 98)));
    }

    #[test]
    fn cells_past_the_coordinate_range_are_skipped() {
        let catalog = NamedBlockCatalog::standard();
        let mut world = MemoryWorld::new([overworld()]);
        let origin = BlockPos::new(i32::MAX, 64, 0);
        let def = definition(vec![
            StructureBlockEntry::new("minecraft:stone", 0, 0, 0),
            StructureBlockEntry::new("minecraft:stone", 1, 0, 0),
        ]);
        let report = place_structure(&mut world, &catalog, &def, &PlacementRequest::new(overworld(), origin));
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.recorded, vec![origin]);
    }

    #[test]
    fn rotating_the_minimum_offset_does_not_overflow() {
        let request = PlacementRequest::new(overworld(), BlockPos::new(-10, 64, 0)).facing(Facing::North);
        assert_eq!(request.resolve((i32::MIN, 0, 0)), Some(BlockPos::new(i32::MAX - 10, 64, 0)));
        let request = PlacementRequest::new(overworld(), BlockPos::new(10, 64, 0)).facing(Facing::North);
        assert_eq!(request.resolve((i32::MIN, 0, 0)), None);
    }
}
