//! Region authoring and bootstrap decoration against the in-memory host.

use std::fs;

use voidworld_core::{ActorId, BlockPos, Facing, RegistryKey};
use voidworld_testkit::{block_name, overworld, region, standard_host, temp_dir, RecordingSink};
use voidworld_world::{
    generate, Archetype, BlockCatalog, BlockState, BootstrapLayout, BoundarySelector,
    LocationRegistry, LocationType, MarkOutcome, MemoryWorld, MessageChannel, NamedBlockCatalog,
    SessionConfig, UpdateFlags, WorldAccess, WorldBootstrapper, WorldSession,
};

fn city_layout() -> BootstrapLayout {
    let mut city = region("test_city", (0, 64, 0), (50, 70, 50), LocationType::City);
    city.tags = ["zeta", "trading", "act_2", "main_city"]
        .into_iter()
        .map(String::from)
        .collect();
    BootstrapLayout::empty().with_dimension("test", overworld(), vec![city])
}

fn name_at(world: &MemoryWorld, catalog: &NamedBlockCatalog, x: i32, y: i32, z: i32) -> String {
    block_name(world, catalog, &overworld(), BlockPos::new(x, y, z))
}

#[test]
fn wand_selection_normalizes_in_either_order() {
    let actor = ActorId(3);
    for (first, second) in [
        (BlockPos::new(5, 5, 5), BlockPos::new(1, 10, 2)),
        (BlockPos::new(1, 10, 2), BlockPos::new(5, 5, 5)),
    ] {
        let mut selector = BoundarySelector::new();
        let mut registry = LocationRegistry::new();
        let mut sink = RecordingSink::new();

        assert_eq!(selector.mark(actor, first, &mut sink), MarkOutcome::Corner1(first));
        match selector.mark(actor, second, &mut sink) {
            MarkOutcome::Completed { min, max, volume, .. } => {
                assert_eq!(min, BlockPos::new(1, 5, 2));
                assert_eq!(max, BlockPos::new(5, 10, 5));
                assert_eq!(volume, 5 * 6 * 4);
            }
            other => panic!("expected a completed selection, got {other:?}"),
        }

        let key = selector
            .create(
                actor,
                &mut registry,
                "voidworld:plaza",
                "district",
                None,
                &overworld(),
                BlockPos::new(3, 6, 3),
                &mut sink,
            )
            .expect("create");
        let plaza = registry.get(&key).unwrap();
        assert_eq!((plaza.min, plaza.max), (BlockPos::new(1, 5, 2), BlockPos::new(5, 10, 5)));
        assert_eq!(plaza.spawn_point, Some(BlockPos::new(3, 6, 3)));
        assert_eq!(
            sink.texts(actor, MessageChannel::Chat).last().copied(),
            Some("Bounds: [1, 5, 2] to [5, 10, 5]")
        );
        assert!(selector.selection(actor).is_none());
    }
}

#[test]
fn failed_create_keeps_the_selection() {
    let actor = ActorId(4);
    let mut selector = BoundarySelector::new();
    let mut registry = LocationRegistry::new();
    let mut sink = RecordingSink::new();

    selector.mark(actor, BlockPos::new(0, 0, 0), &mut sink);
    selector.mark(actor, BlockPos::new(4, 4, 4), &mut sink);
    let err = selector
        .create(actor, &mut registry, "yard", "GARDEN", None, &overworld(), BlockPos::ORIGIN, &mut sink)
        .unwrap_err();
    assert!(err.to_string().starts_with("Invalid type: GARDEN"));
    assert!(registry.is_empty());

    selector
        .create(actor, &mut registry, "yard", "room", None, &overworld(), BlockPos::ORIGIN, &mut sink)
        .expect("retry succeeds");
    assert!(registry.get(&RegistryKey::voidworld("yard")).is_some());
}

#[test]
fn city_outline_uses_its_palette() {
    let (mut world, catalog) = standard_host();
    let mut registry = LocationRegistry::new();
    let mut bootstrapper = WorldBootstrapper::new(city_layout());

    assert_eq!(bootstrapper.bootstrap_dimension("test", &mut world, &catalog, &mut registry), 1);
    assert!(registry.get(&RegistryKey::voidworld("test_city")).is_some());

    for (x, z) in [(0, 0), (50, 50), (0, 25), (25, 50), (17, 33)] {
        assert_eq!(name_at(&world, &catalog, x, 64, z), "minecraft:stone_bricks", "floor at ({x}, {z})");
    }
    for (x, z) in [(25, 0), (0, 25), (50, 12), (40, 50)] {
        assert_eq!(name_at(&world, &catalog, x, 65, z), "minecraft:red_concrete", "border at ({x}, {z})");
    }
    assert_eq!(name_at(&world, &catalog, 10, 65, 10), "minecraft:air");

    for (x, z) in [(0, 0), (50, 0), (0, 50), (50, 50)] {
        for y in 65..=67 {
            assert_eq!(name_at(&world, &catalog, x, y, z), "minecraft:red_glazed_terracotta");
        }
        assert_eq!(name_at(&world, &catalog, x, 68, z), "minecraft:torch");
    }
    for y in 65..=67 {
        assert_eq!(name_at(&world, &catalog, 25, y, 25), "minecraft:glowstone");
    }

    let sign = BlockPos::new(25, 65, 24);
    assert_eq!(block_name(&world, &catalog, &overworld(), sign), "minecraft:oak_sign");
    assert_eq!(
        world.sign_text(&overworld(), sign).unwrap(),
        &[
            "=== CITY ===".to_string(),
            "test_city".to_string(),
            "51x51".to_string(),
            "act_2,main_city,trading".to_string(),
        ]
    );
}

#[test]
fn large_region_floor_is_a_grid() {
    let (mut world, catalog) = standard_host();
    let mut registry = LocationRegistry::new();
    let field = region("field", (0, 10, 0), (120, 12, 40), LocationType::Wilderness);
    let layout = BootstrapLayout::empty().with_dimension("test", overworld(), vec![field]);
    let mut bootstrapper = WorldBootstrapper::new(layout);
    bootstrapper.bootstrap_dimension("test", &mut world, &catalog, &mut registry);

    let floor = |x: i32, z: i32| world.block_at(&overworld(), BlockPos::new(x, 10, z)).id;
    assert!(!catalog.is_air(floor(16, 5)));
    assert!(!catalog.is_air(floor(5, 32)));
    assert!(!catalog.is_air(floor(120, 7)));
    assert!(catalog.is_air(floor(5, 5)));
    assert!(catalog.is_air(floor(17, 17)));
}

#[test]
fn ensure_bootstrapped_runs_once_per_dimension() {
    let (mut world, catalog) = standard_host();
    let mut registry = LocationRegistry::new();
    let mut bootstrapper = WorldBootstrapper::new(city_layout()).with_probe(BlockPos::new(0, 64, 0));

    assert_eq!(bootstrapper.ensure_bootstrapped("test", &mut world, &catalog, &mut registry), 1);
    world.enable_write_log();
    assert_eq!(bootstrapper.ensure_bootstrapped("test", &mut world, &catalog, &mut registry), 0);
    assert!(world.take_write_log().is_empty());
}

#[test]
fn occupied_probe_skips_bootstrap() {
    let (mut world, catalog) = standard_host();
    let mut registry = LocationRegistry::new();
    let stone = catalog.resolve("minecraft:stone").unwrap();
    world.set_block(&overworld(), BlockPos::new(0, 64, 0), BlockState::of(stone), UpdateFlags::ALL);

    let mut bootstrapper = WorldBootstrapper::new(city_layout());
    assert_eq!(bootstrapper.ensure_bootstrapped("test", &mut world, &catalog, &mut registry), 0);
    assert!(registry.is_empty());
}

#[test]
fn bootstrap_skips_dimensions_the_host_lacks() {
    let catalog = NamedBlockCatalog::standard();
    let mut world = MemoryWorld::new([overworld()]);
    let mut registry = LocationRegistry::new();
    let mut bootstrapper = WorldBootstrapper::default();

    let total = bootstrapper.bootstrap_all(&mut world, &catalog, &mut registry);
    assert_eq!(total, 30);
    assert_eq!(registry.len(), 30);
    assert!(registry
        .in_dimension(&RegistryKey::voidworld("cosmic_platform"))
        .is_empty());
}

#[test]
fn generated_tower_lands_in_the_world() {
    let (mut world, catalog) = standard_host();
    let dir = temp_dir("structures");
    let tower = generate(Archetype::CastleTower);
    fs::write(dir.join("tower_castle.json"), tower.to_json_pretty().unwrap()).unwrap();

    let mut session = WorldSession::new(SessionConfig {
        structures_dir: dir,
        ..SessionConfig::default()
    });
    let actor = ActorId(5);
    let report = session
        .place(&mut world, &catalog, "tower_castle", &overworld(), BlockPos::ORIGIN, Facing::South, actor)
        .expect("structure exists");
    assert_eq!(report.skipped, 0);

    assert_eq!(name_at(&world, &catalog, 3, 5, 0), "minecraft:glass_pane");
    assert_eq!(name_at(&world, &catalog, 0, 5, 1), "minecraft:stone_bricks");
    assert_eq!(name_at(&world, &catalog, 0, 13, 0), "minecraft:stone_bricks");
    assert_eq!(name_at(&world, &catalog, 1, 13, 0), "minecraft:air");

    assert!(session.can_undo(actor));
    assert_eq!(session.undo(actor, &mut world, &catalog), report.recorded.len());
    assert_eq!(world.solid_count(&overworld()), 0);
    assert!(!session.can_undo(actor));
}
