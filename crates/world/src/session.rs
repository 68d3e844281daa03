//! Explicitly owned service bundling every piece of per-world state.
//!
//! One `WorldSession` lives from world start to world stop. The host drives
//! it from its tick loop and hands in its world and block catalog per call.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};
use voidworld_core::{ActorId, BlockPos, Facing, RegistryKey, SimTick};

use crate::bootstrap::{WorldBootstrapper, DEFAULT_PROBE};
use crate::history::PlacementHistory;
use crate::host::{BlockCatalog, MessageSink, WorldAccess};
use crate::layout::BootstrapLayout;
use crate::location_registry::{LoadReport, LocationRegistry};
use crate::placement::{place_structure, PlacementReport, PlacementRequest};
use crate::selection::{BoundarySelector, MarkOutcome};
use crate::structure::{StructureDefinition, StructureLoader, DEFAULT_CACHE_SIZE, DEFAULT_STRUCTURES_DIR};
use crate::tracker::{ActorPosition, LocationTracker, CHECK_INTERVAL};

/// Settings a session is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Data-pack `locations/` tree loaded by [`WorldSession::init`].
    pub data_dir: Option<PathBuf>,
    /// Structure catalog directory.
    pub structures_dir: PathBuf,
    /// Parsed structures kept in memory.
    pub structure_cache_size: usize,
    /// Tracker polling period in ticks.
    pub check_interval: u32,
    /// Cell probed before auto-bootstrapping a dimension.
    pub bootstrap_probe: BlockPos,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            structures_dir: PathBuf::from(DEFAULT_STRUCTURES_DIR),
            structure_cache_size: DEFAULT_CACHE_SIZE,
            check_interval: CHECK_INTERVAL,
            bootstrap_probe: DEFAULT_PROBE,
        }
    }
}

/// Region registry, tracker, selector, undo history and structure catalog of one world.
pub struct WorldSession {
    config: SessionConfig,
    tick: SimTick,
    registry: LocationRegistry,
    tracker: LocationTracker,
    selector: BoundarySelector,
    history: PlacementHistory,
    structures: StructureLoader,
    bootstrapper: WorldBootstrapper,
}

impl WorldSession {
    /// Session over the built-in bootstrap layout.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_layout(config, BootstrapLayout::builtin())
    }

    /// Session over a custom bootstrap layout.
    pub fn with_layout(config: SessionConfig, layout: BootstrapLayout) -> Self {
        Self {
            tick: SimTick::ZERO,
            registry: LocationRegistry::new(),
            tracker: LocationTracker::new(config.check_interval),
            selector: BoundarySelector::new(),
            history: PlacementHistory::new(),
            structures: StructureLoader::new(config.structures_dir.clone(), config.structure_cache_size),
            bootstrapper: WorldBootstrapper::new(layout).with_probe(config.bootstrap_probe),
            config,
        }
    }

    /// World start: load the configured data-pack regions.
    pub fn init(&mut self) -> LoadReport {
        self.tick = SimTick::ZERO;
        match self.config.data_dir.clone() {
            Some(dir) => self.registry.load_data_dir(&dir),
            None => LoadReport::default(),
        }
    }

    /// Advance one tick, polling the tracker on its interval.
    pub fn on_tick<'a, I>(&mut self, actors: I, sink: &mut dyn MessageSink) -> bool
    where
        I: IntoIterator<Item = &'a ActorPosition>,
    {
        self.tick = self.tick.advance(1);
        self.tracker.tick(&self.registry, actors, sink)
    }

    /// Forget everything about `actor` without firing events.
    pub fn on_actor_leave(&mut self, actor: ActorId) {
        self.tracker.remove_actor(actor);
        self.selector.clear(actor);
        self.history.clear_actor(actor);
        debug!(%actor, "dropped actor session state");
    }

    /// World stop: drop every region and all per-actor state.
    pub fn shutdown(&mut self) {
        self.registry.clear();
        self.tracker.clear();
        self.selector.clear_all();
        self.history.clear();
        self.structures.invalidate();
        info!(ticks = self.tick.0, "world session shut down");
    }

    /// Ticks since [`WorldSession::init`].
    pub fn current_tick(&self) -> SimTick {
        self.tick
    }

    /// Configuration the session was built from.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Region registry.
    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// Mutable region registry.
    pub fn registry_mut(&mut self) -> &mut LocationRegistry {
        &mut self.registry
    }

    /// Enter/exit tracker.
    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    /// Mutable tracker, for listener registration.
    pub fn tracker_mut(&mut self) -> &mut LocationTracker {
        &mut self.tracker
    }

    /// Undo history.
    pub fn history(&self) -> &PlacementHistory {
        &self.history
    }

    /// Structure catalog.
    pub fn structures_mut(&mut self) -> &mut StructureLoader {
        &mut self.structures
    }

    /// Bootstrapper and its layout.
    pub fn bootstrapper(&self) -> &WorldBootstrapper {
        &self.bootstrapper
    }

    /// Boundary-select action for `actor`.
    pub fn mark(&mut self, actor: ActorId, pos: BlockPos, sink: &mut dyn MessageSink) -> MarkOutcome {
        self.selector.mark(actor, pos, sink)
    }

    /// Selector, for `create` and selection queries.
    pub fn selector(&self) -> &BoundarySelector {
        &self.selector
    }

    /// Split borrow of the selector and the registry for region creation.
    pub fn selector_and_registry(&mut self) -> (&mut BoundarySelector, &mut LocationRegistry) {
        (&mut self.selector, &mut self.registry)
    }

    /// Load, place and record a structure for `actor`.
    ///
    /// Returns `None` when the structure is unknown.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &mut self,
        world: &mut dyn WorldAccess,
        catalog: &dyn BlockCatalog,
        structure_id: &str,
        dimension: &RegistryKey,
        origin: BlockPos,
        facing: Facing,
        actor: ActorId,
    ) -> Option<PlacementReport> {
        let definition = self.structures.load(structure_id)?;
        Some(self.place_definition(world, catalog, structure_id, &definition, dimension, origin, facing, actor))
    }

    /// Place an already loaded definition and record it for `actor`.
    #[allow(clippy::too_many_arguments)]
    pub fn place_definition(
        &mut self,
        world: &mut dyn WorldAccess,
        catalog: &dyn BlockCatalog,
        structure_id: &str,
        definition: &Arc<StructureDefinition>,
        dimension: &RegistryKey,
        origin: BlockPos,
        facing: Facing,
        actor: ActorId,
    ) -> PlacementReport {
        let request = PlacementRequest::new(dimension.clone(), origin).facing(facing);
        let report = place_structure(world, catalog, definition, &request);
        if !report.recorded.is_empty() {
            self.history
                .push(actor, structure_id, dimension.clone(), report.recorded.clone());
        }
        report
    }

    /// Undo `actor`'s latest placement.
    pub fn undo(&mut self, actor: ActorId, world: &mut dyn WorldAccess, catalog: &dyn BlockCatalog) -> usize {
        self.history.undo(actor, world, catalog)
    }

    /// Whether `actor` has a placement to undo.
    pub fn can_undo(&self, actor: ActorId) -> bool {
        self.history.can_undo(actor)
    }

    /// Decorate and register one layout dimension.
    pub fn bootstrap_dimension(&mut self, name: &str, world: &mut dyn WorldAccess, catalog: &dyn BlockCatalog) -> usize {
        self.bootstrapper
            .bootstrap_dimension(name, world, catalog, &mut self.registry)
    }

    /// Decorate and register every layout dimension.
    pub fn bootstrap_all(&mut self, world: &mut dyn WorldAccess, catalog: &dyn BlockCatalog) -> usize {
        self.bootstrapper.bootstrap_all(world, catalog, &mut self.registry)
    }

    /// First-visit bootstrap of one layout dimension.
    pub fn ensure_bootstrapped(&mut self, name: &str, world: &mut dyn WorldAccess, catalog: &dyn BlockCatalog) -> usize {
        self.bootstrapper
            .ensure_bootstrapped(name, world, catalog, &mut self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullSink;
    use crate::location::{GameLocation, LocationType};
    use crate::memory::{MemoryWorld, NamedBlockCatalog};
    use crate::structure::StructureBlockEntry;

    fn overworld() -> RegistryKey {
        RegistryKey::minecraft("overworld")
    }

    #[test]
    fn placement_is_recorded_and_undone() {
        let catalog = NamedBlockCatalog::standard();
        let mut world = MemoryWorld::new([overworld()]);
        let mut session = WorldSession::new(SessionConfig::default());
        let definition = Arc::new(StructureDefinition {
            name: "Post".into(),
            blocks: vec![
                StructureBlockEntry::new("minecraft:oak_log", 0, 0, 0),
                StructureBlockEntry::new("minecraft:oak_log", 0, 1, 0),
            ],
            block_image: None,
        });
        let actor = ActorId(1);
        let report = session.place_definition(
            &mut world,
            &catalog,
            "post",
            &definition,
            &overworld(),
            BlockPos::new(5, 64, 5),
            Facing::North,
            actor,
        );
        assert_eq!(report.recorded.len(), 2);
        assert!(session.can_undo(actor));
        assert_eq!(session.undo(actor, &mut world, &catalog), 2);
        assert_eq!(world.solid_count(&overworld()), 0);
    }

    #[test]
    fn unknown_structure_places_nothing() {
        let catalog = NamedBlockCatalog::standard();
        let mut world = MemoryWorld::new([overworld()]);
        let mut session = WorldSession::new(SessionConfig {
            structures_dir: std::env::temp_dir().join("voidworld_no_structures_here"),
            ..SessionConfig::default()
        });
        let placed = session.place(
            &mut world,
            &catalog,
            "tower_castle",
            &overworld(),
            BlockPos::ORIGIN,
            Facing::South,
            ActorId(1),
        );
        assert!(placed.is_none());
        assert!(!session.can_undo(ActorId(1)));
    }

    #[test]
    fn leave_drops_actor_state_and_shutdown_clears_regions() {
        let mut session = WorldSession::new(SessionConfig {
            check_interval: 1,
            ..SessionConfig::default()
        });
        session.registry_mut().register(GameLocation::new(
            RegistryKey::voidworld("yard"),
            overworld(),
            BlockPos::new(0, 0, 0),
            BlockPos::new(9, 9, 9),
            LocationType::Room,
        ));
        let actor = ActorId(2);
        let positions = [ActorPosition {
            actor,
            dimension: overworld(),
            pos: BlockPos::new(1, 1, 1),
        }];
        assert!(session.on_tick(&positions, &mut NullSink));
        assert!(session.tracker().is_in_location(actor, &RegistryKey::voidworld("yard")));
        session.mark(actor, BlockPos::ORIGIN, &mut NullSink);

        session.on_actor_leave(actor);
        assert!(session.tracker().current_locations(actor).is_none());
        assert!(session.selector().selection(actor).is_none());

        session.shutdown();
        assert!(session.registry().is_empty());
        assert_eq!(session.current_tick(), SimTick(1));
    }
}
