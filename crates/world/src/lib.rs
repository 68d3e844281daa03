//! Named regions, enter/exit tracking and structure placement for VoidWorld.
//!
//! The host engine is reached only through the traits in [`host`]; the
//! [`MemoryWorld`] host backs the console binary and the tests.

pub mod bootstrap;
pub mod generator;
pub mod history;
pub mod host;
pub mod layout;
pub mod location;
pub mod location_registry;
pub mod memory;
pub mod placement;
pub mod selection;
pub mod session;
pub mod structure;
pub mod tracker;

pub use bootstrap::{sign_lines, Palette, WorldBootstrapper, DEFAULT_PALETTE, DEFAULT_PROBE};
pub use generator::{generate, Archetype, Cell};
pub use history::{PlacementEntry, PlacementHistory};
pub use host::{
    BlockCatalog, BlockId, BlockState, MessageChannel, MessageSink, NullSink, UpdateFlags,
    WorldAccess,
};
pub use layout::{BootstrapLayout, LayoutDimension};
pub use location::{GameLocation, LocationData, LocationType};
pub use location_registry::{LoadReport, LocationError, LocationRegistry, DEFAULT_NEAREST_RADIUS};
pub use memory::{MemoryWorld, NamedBlockCatalog, WriteRecord, AIR, STANDARD_BLOCKS};
pub use placement::{place_structure, PlacementReport, PlacementRequest};
pub use selection::{BoundarySelector, MarkOutcome, SelectionError, SelectionState};
pub use session::{SessionConfig, WorldSession};
pub use structure::{
    is_valid_structure_id, StructureBlockEntry, StructureDefinition, StructureError,
    StructureLoader, DEFAULT_CACHE_SIZE, DEFAULT_STRUCTURES_DIR,
};
pub use tracker::{ActorPosition, LocationListener, LocationTracker, PollResult, CHECK_INTERVAL};
