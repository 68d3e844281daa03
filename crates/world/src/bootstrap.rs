//! Schematic outlines for every scripted region.
//!
//! For each region the bootstrapper lays a floor at `min.y`, a one-block
//! border ring above it, torch-topped corner pillars, a centre pillar and an
//! info sign next to it. Materials come from the region type's [`Palette`].
//! Re-running overwrites the same cells with the same blocks.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};
use voidworld_core::{BlockPos, RegistryKey};

use crate::host::{BlockCatalog, BlockId, BlockState, UpdateFlags, WorldAccess};
use crate::layout::BootstrapLayout;
use crate::location::{GameLocation, LocationType};
use crate::location_registry::LocationRegistry;

/// Extent beyond which floors are sparsified to edges and a grid.
pub const LARGE_REGION_EXTENT: i32 = 100;

/// Grid spacing of sparse floors.
pub const FLOOR_GRID: i32 = 16;

/// Default cell probed by [`WorldBootstrapper::ensure_bootstrapped`].
pub const DEFAULT_PROBE: BlockPos = BlockPos::new(0, 64, 0);

const TORCH: &str = "minecraft:torch";
const SIGN: &str = "minecraft:oak_sign";

/// Four decoration materials for one region type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Floor layer.
    pub floor: &'static str,
    /// Border ring.
    pub border: &'static str,
    /// Corner pillars.
    pub corner: &'static str,
    /// Centre pillar.
    pub center: &'static str,
}

const fn palette(
    floor: &'static str,
    border: &'static str,
    corner: &'static str,
    center: &'static str,
) -> Palette {
    Palette {
        floor,
        border,
        corner,
        center,
    }
}

/// Palette for types without their own entry.
pub const DEFAULT_PALETTE: Palette = palette(
    "minecraft:stone",
    "minecraft:white_concrete",
    "minecraft:white_glazed_terracotta",
    "minecraft:glowstone",
);

impl Palette {
    /// Palette keyed by region type.
    pub const fn for_type(kind: LocationType) -> Palette {
        match kind {
            LocationType::City => palette(
                "minecraft:stone_bricks",
                "minecraft:red_concrete",
                "minecraft:red_glazed_terracotta",
                "minecraft:glowstone",
            ),
            LocationType::District => palette(
                "minecraft:smooth_stone",
                "minecraft:orange_concrete",
                "minecraft:orange_glazed_terracotta",
                "minecraft:sea_lantern",
            ),
            LocationType::Building => palette(
                "minecraft:polished_andesite",
                "minecraft:yellow_concrete",
                "minecraft:yellow_glazed_terracotta",
                "minecraft:glowstone",
            ),
            LocationType::Dungeon => palette(
                "minecraft:deepslate_bricks",
                "minecraft:purple_concrete",
                "minecraft:purple_glazed_terracotta",
                "minecraft:soul_lantern",
            ),
            LocationType::Room => palette(
                "minecraft:polished_deepslate",
                "minecraft:magenta_concrete",
                "minecraft:magenta_glazed_terracotta",
                "minecraft:lantern",
            ),
            LocationType::Wilderness => palette(
                "minecraft:grass_block",
                "minecraft:green_concrete",
                "minecraft:green_glazed_terracotta",
                "minecraft:glowstone",
            ),
            LocationType::QuestArea => palette(
                "minecraft:smooth_sandstone",
                "minecraft:light_blue_concrete",
                "minecraft:light_blue_glazed_terracotta",
                "minecraft:sea_lantern",
            ),
            LocationType::VoidCrack => palette(
                "minecraft:obsidian",
                "minecraft:black_concrete",
                "minecraft:crying_obsidian",
                "minecraft:end_rod",
            ),
            LocationType::TeleportPoint => palette(
                "minecraft:end_stone_bricks",
                "minecraft:cyan_concrete",
                "minecraft:cyan_glazed_terracotta",
                "minecraft:beacon",
            ),
            LocationType::SpawnZone => palette(
                "minecraft:netherrack",
                "minecraft:red_nether_bricks",
                "minecraft:magma_block",
                "minecraft:soul_lantern",
            ),
            LocationType::PointOfInterest => palette(
                "minecraft:end_stone_bricks",
                "minecraft:light_gray_concrete",
                "minecraft:light_gray_glazed_terracotta",
                "minecraft:end_rod",
            ),
            LocationType::HousingPlot | LocationType::ProtectedZone | LocationType::Waypoint => {
                DEFAULT_PALETTE
            }
        }
    }
}

fn put(world: &mut dyn WorldAccess, dimension: &RegistryKey, pos: BlockPos, block: Option<BlockId>) {
    if let Some(id) = block {
        world.set_block(dimension, pos, BlockState::of(id), UpdateFlags::ALL);
    }
}

/// Four sign lines: type banner, ID path, footprint, up to three tags.
pub fn sign_lines(location: &GameLocation) -> [String; 4] {
    let (width, depth) = location.footprint();
    [
        format!("=== {} ===", location.kind),
        location.id.path().to_string(),
        format!("{width}x{depth}"),
        location
            .tags
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(","),
    ]
}

/// Decorates and registers the regions of a [`BootstrapLayout`].
pub struct WorldBootstrapper {
    layout: BootstrapLayout,
    probe: BlockPos,
    missing: BTreeSet<String>,
}

impl Default for WorldBootstrapper {
    fn default() -> Self {
        Self::new(BootstrapLayout::builtin())
    }
}

impl WorldBootstrapper {
    /// Bootstrapper over `layout`, probing [`DEFAULT_PROBE`].
    pub fn new(layout: BootstrapLayout) -> Self {
        Self {
            layout,
            probe: DEFAULT_PROBE,
            missing: BTreeSet::new(),
        }
    }

    /// Same bootstrapper probing `probe` instead.
    pub fn with_probe(mut self, probe: BlockPos) -> Self {
        self.probe = probe;
        self
    }

    /// Layout being bootstrapped.
    pub fn layout(&self) -> &BootstrapLayout {
        &self.layout
    }

    /// Decorate and register every region of every layout dimension, in layout order.
    pub fn bootstrap_all(
        &mut self,
        world: &mut dyn WorldAccess,
        catalog: &dyn BlockCatalog,
        registry: &mut LocationRegistry,
    ) -> usize {
        let names: Vec<String> = self.layout.names().into_iter().map(str::to_string).collect();
        let mut total = 0;
        for name in &names {
            total += self.bootstrap_dimension(name, world, catalog, registry);
        }
        total
    }

    /// Decorate and register the regions of one layout dimension.
    ///
    /// Returns 0 when the name is not in the layout or the host lacks the dimension.
    pub fn bootstrap_dimension(
        &mut self,
        name: &str,
        world: &mut dyn WorldAccess,
        catalog: &dyn BlockCatalog,
        registry: &mut LocationRegistry,
    ) -> usize {
        let Some(entry) = self.layout.dimension(name) else {
            warn!("Unknown dimension for bootstrap: {name}");
            return 0;
        };
        if !world.has_dimension(&entry.dimension) {
            warn!(dimension = %entry.dimension, "could not resolve dimension for bootstrap: {name}");
            return 0;
        }

        let dimension = entry.dimension.clone();
        let locations = entry.locations.clone();
        let mut count = 0;
        for mut location in locations {
            location.dimension = dimension.clone();
            self.decorate(world, catalog, &location);
            registry.register(location);
            count += 1;
        }

        info!(count, dimension = %dimension, "bootstrapped locations in {name}");
        count
    }

    /// Bootstrap `name` only when the probe cell in that dimension is air.
    pub fn ensure_bootstrapped(
        &mut self,
        name: &str,
        world: &mut dyn WorldAccess,
        catalog: &dyn BlockCatalog,
        registry: &mut LocationRegistry,
    ) -> usize {
        let Some(entry) = self.layout.dimension(name) else {
            return 0;
        };
        if !world.has_dimension(&entry.dimension) {
            return 0;
        }
        let probed = world.block_at(&entry.dimension, self.probe);
        if !catalog.is_air(probed.id) {
            debug!(dimension = %entry.dimension, probe = %self.probe, "already bootstrapped");
            return 0;
        }
        self.bootstrap_dimension(name, world, catalog, registry)
    }

    /// Place the outline of one region in its own dimension.
    pub fn decorate(&mut self, world: &mut dyn WorldAccess, catalog: &dyn BlockCatalog, location: &GameLocation) {
        let palette = Palette::for_type(location.kind);
        let dimension = &location.dimension;
        let (min, max) = (location.min, location.max);
        let floor_y = min.y;

        let floor = self.material(catalog, palette.floor);
        let (size_x, _, size_z) = location.size();
        let large = size_x > LARGE_REGION_EXTENT as u64 + 1 || size_z > LARGE_REGION_EXTENT as u64 + 1;
        let on_grid = |v: i32, lo: i32| (i64::from(v) - i64::from(lo)) % i64::from(FLOOR_GRID) == 0;
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                let edge = x == min.x || x == max.x || z == min.z || z == max.z;
                let grid = on_grid(x, min.x) || on_grid(z, min.z);
                if !large || edge || grid {
                    put(world, dimension, BlockPos::new(x, floor_y, z), floor);
                }
            }
        }

        let border = self.material(catalog, palette.border);
        let ring_y = floor_y.saturating_add(1);
        for x in min.x..=max.x {
            put(world, dimension, BlockPos::new(x, ring_y, min.z), border);
            put(world, dimension, BlockPos::new(x, ring_y, max.z), border);
        }
        for z in min.z..=max.z {
            put(world, dimension, BlockPos::new(min.x, ring_y, z), border);
            put(world, dimension, BlockPos::new(max.x, ring_y, z), border);
        }

        let corner = self.material(catalog, palette.corner);
        let torch = self.material(catalog, TORCH);
        for (x, z) in [(min.x, min.z), (max.x, min.z), (min.x, max.z), (max.x, max.z)] {
            let base = BlockPos::new(x, ring_y, z);
            for dy in 0..3 {
                put(world, dimension, base.above(dy), corner);
            }
            put(world, dimension, base.above(3), torch);
        }

        let center = self.material(catalog, palette.center);
        let middle = location.center();
        let (cx, cz) = (middle.x, middle.z);
        for dy in 0..3 {
            put(world, dimension, BlockPos::new(cx, ring_y, cz).above(dy), center);
        }

        if let Some(sign) = self.material(catalog, SIGN) {
            let sign_pos = BlockPos::new(cx, ring_y, cz.saturating_sub(1));
            if world.set_block(dimension, sign_pos, BlockState::of(sign), UpdateFlags::ALL) {
                world.set_sign_text(dimension, sign_pos, sign_lines(location));
            }
        }

        debug!(id = %location.id, kind = %location.kind, "placed outline");
    }

    fn material(&mut self, catalog: &dyn BlockCatalog, identifier: &str) -> Option<BlockId> {
        let resolved = catalog.resolve(identifier);
        if resolved.is_none() && self.missing.insert(identifier.to_string()) {
            warn!(block = identifier, "bootstrap material not in block catalog, skipping");
        }
        resolved
    }
}
