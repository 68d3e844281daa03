//! Region and host fixtures shared by integration tests.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use voidworld_core::{BlockPos, RegistryKey};
use voidworld_world::{GameLocation, LocationType, MemoryWorld, NamedBlockCatalog};

/// `minecraft:overworld`.
pub fn overworld() -> RegistryKey {
    RegistryKey::minecraft("overworld")
}

/// Overworld region `voidworld:<id>` spanning two raw corners.
pub fn region(id: &str, a: (i32, i32, i32), b: (i32, i32, i32), kind: LocationType) -> GameLocation {
    GameLocation::new(
        RegistryKey::voidworld(id),
        overworld(),
        BlockPos::new(a.0, a.1, a.2),
        BlockPos::new(b.0, b.1, b.2),
        kind,
    )
}

/// In-memory host with the three campaign dimensions and the standard catalog.
pub fn standard_host() -> (MemoryWorld, NamedBlockCatalog) {
    let catalog = NamedBlockCatalog::standard();
    let world = MemoryWorld::new([
        overworld(),
        RegistryKey::voidworld("cosmic_platform"),
        RegistryKey::voidworld("consciousness_planet"),
    ])
    .with_catalog(&catalog);
    (world, catalog)
}

/// Fresh directory under the system temp dir, unique per call.
pub fn temp_dir(label: &str) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!("voidworld_{label}_{timestamp}"));
    fs::create_dir_all(&dir).expect("temp dir create");
    dir
}

/// Identifier of the block at `pos`, `"?"` for ids the catalog does not know.
pub fn block_name(
    world: &MemoryWorld,
    catalog: &NamedBlockCatalog,
    dimension: &RegistryKey,
    pos: BlockPos,
) -> String {
    use voidworld_world::{BlockCatalog, WorldAccess};
    let id = world.block_at(dimension, pos).id;
    catalog.name_of(id).unwrap_or("?").to_string()
}
