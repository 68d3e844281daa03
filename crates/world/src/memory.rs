//! Deterministic in-memory host used by the headless console and tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use voidworld_core::{BlockPos, RegistryKey};

use crate::host::{BlockCatalog, BlockId, BlockState, UpdateFlags, WorldAccess};

/// Identifier of the air sentinel in every [`NamedBlockCatalog`].
pub const AIR: &str = "minecraft:air";

/// Block identifiers every catalog built by [`NamedBlockCatalog::standard`] knows.
///
/// Covers the bootstrap palettes, the generator archetypes and the usual
/// building materials found in structure files.
pub const STANDARD_BLOCKS: &[&str] = &[
    "minecraft:stone",
    "minecraft:stone_bricks",
    "minecraft:stone_brick_slab",
    "minecraft:smooth_stone",
    "minecraft:polished_andesite",
    "minecraft:deepslate_bricks",
    "minecraft:polished_deepslate",
    "minecraft:grass_block",
    "minecraft:dirt",
    "minecraft:smooth_sandstone",
    "minecraft:obsidian",
    "minecraft:crying_obsidian",
    "minecraft:end_stone_bricks",
    "minecraft:netherrack",
    "minecraft:red_nether_bricks",
    "minecraft:magma_block",
    "minecraft:cobblestone",
    "minecraft:oak_planks",
    "minecraft:oak_log",
    "minecraft:oak_leaves",
    "minecraft:glass",
    "minecraft:glass_pane",
    "minecraft:torch",
    "minecraft:oak_sign",
    "minecraft:glowstone",
    "minecraft:sea_lantern",
    "minecraft:soul_lantern",
    "minecraft:lantern",
    "minecraft:end_rod",
    "minecraft:beacon",
    "minecraft:red_concrete",
    "minecraft:orange_concrete",
    "minecraft:yellow_concrete",
    "minecraft:purple_concrete",
    "minecraft:magenta_concrete",
    "minecraft:green_concrete",
    "minecraft:light_blue_concrete",
    "minecraft:black_concrete",
    "minecraft:cyan_concrete",
    "minecraft:light_gray_concrete",
    "minecraft:white_concrete",
    "minecraft:red_glazed_terracotta",
    "minecraft:orange_glazed_terracotta",
    "minecraft:yellow_glazed_terracotta",
    "minecraft:purple_glazed_terracotta",
    "minecraft:magenta_glazed_terracotta",
    "minecraft:green_glazed_terracotta",
    "minecraft:light_blue_glazed_terracotta",
    "minecraft:cyan_glazed_terracotta",
    "minecraft:light_gray_glazed_terracotta",
    "minecraft:white_glazed_terracotta",
];

/// Catalog assigning sequential ids to a fixed list of identifiers; id 0 is air.
#[derive(Debug, Clone)]
pub struct NamedBlockCatalog {
    names: Vec<String>,
    ids: HashMap<String, BlockId>,
}

impl NamedBlockCatalog {
    /// Build a catalog from identifiers. Air is always registered first;
    /// duplicates keep their first id.
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self {
            names: Vec::new(),
            ids: HashMap::new(),
        };
        catalog.insert(AIR.to_string());
        for identifier in identifiers {
            catalog.insert(identifier.into());
        }
        catalog
    }

    /// Catalog with [`STANDARD_BLOCKS`].
    pub fn standard() -> Self {
        Self::new(STANDARD_BLOCKS.iter().copied())
    }

    /// Register an extra identifier, returning its id.
    pub fn insert(&mut self, identifier: String) -> BlockId {
        if let Some(id) = self.ids.get(&identifier) {
            return *id;
        }
        let id = self.names.len() as BlockId;
        self.ids.insert(identifier.clone(), id);
        self.names.push(identifier);
        id
    }

    /// Number of known identifiers, air included.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: air is registered on construction.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl BlockCatalog for NamedBlockCatalog {
    fn resolve(&self, identifier: &str) -> Option<BlockId> {
        let identifier = identifier.trim();
        if let Some(id) = self.ids.get(identifier) {
            return Some(*id);
        }
        // Bare paths resolve in the vanilla namespace.
        if !identifier.contains(':') {
            return self.ids.get(&format!("minecraft:{identifier}")).copied();
        }
        None
    }

    fn air(&self) -> BlockId {
        0
    }

    fn name_of(&self, id: BlockId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }
}

/// One recorded block write, kept when write logging is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// Target dimension.
    pub dimension: RegistryKey,
    /// Target cell.
    pub pos: BlockPos,
    /// Written state.
    pub state: BlockState,
    /// Requested side effects.
    pub flags: UpdateFlags,
}

/// Sparse block grid per dimension. Untouched cells read as air.
///
/// Air defaults to id 0, the [`NamedBlockCatalog`] layout; pair the world with
/// another catalog through [`MemoryWorld::with_catalog`].
#[derive(Debug, Default)]
pub struct MemoryWorld {
    air: BlockId,
    dimensions: BTreeSet<RegistryKey>,
    blocks: BTreeMap<(RegistryKey, BlockPos), BlockState>,
    signs: BTreeMap<(RegistryKey, BlockPos), [String; 4]>,
    write_log: Option<Vec<WriteRecord>>,
}

impl MemoryWorld {
    /// World with the given dimensions loaded.
    pub fn new<I>(dimensions: I) -> Self
    where
        I: IntoIterator<Item = RegistryKey>,
    {
        Self {
            dimensions: dimensions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Take the air id from `catalog`.
    pub fn with_catalog(mut self, catalog: &dyn BlockCatalog) -> Self {
        self.air = catalog.air();
        self
    }

    /// Load an additional dimension.
    pub fn add_dimension(&mut self, dimension: RegistryKey) {
        self.dimensions.insert(dimension);
    }

    /// Loaded dimensions in key order.
    pub fn dimensions(&self) -> impl Iterator<Item = &RegistryKey> + '_ {
        self.dimensions.iter()
    }

    /// Start recording every accepted write.
    pub fn enable_write_log(&mut self) {
        self.write_log.get_or_insert_with(Vec::new);
    }

    /// Take the recorded writes, leaving logging enabled.
    pub fn take_write_log(&mut self) -> Vec<WriteRecord> {
        self.write_log.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Number of non-air cells in `dimension`.
    pub fn solid_count(&self, dimension: &RegistryKey) -> usize {
        self.blocks
            .keys()
            .filter(|(dim, _)| dim == dimension)
            .count()
    }

    /// Sign text at `pos`, if a sign was written there.
    pub fn sign_text(&self, dimension: &RegistryKey, pos: BlockPos) -> Option<&[String; 4]> {
        self.signs.get(&(dimension.clone(), pos))
    }
}

impl WorldAccess for MemoryWorld {
    fn has_dimension(&self, dimension: &RegistryKey) -> bool {
        self.dimensions.contains(dimension)
    }

    fn block_at(&self, dimension: &RegistryKey, pos: BlockPos) -> BlockState {
        self.blocks
            .get(&(dimension.clone(), pos))
            .cloned()
            .unwrap_or_else(|| BlockState::of(self.air))
    }

    fn set_block(
        &mut self,
        dimension: &RegistryKey,
        pos: BlockPos,
        state: BlockState,
        flags: UpdateFlags,
    ) -> bool {
        if !self.dimensions.contains(dimension) {
            return false;
        }
        let key = (dimension.clone(), pos);
        if state.id == self.air {
            self.blocks.remove(&key);
        } else {
            self.blocks.insert(key.clone(), state.clone());
        }
        self.signs.remove(&key);
        if let Some(log) = self.write_log.as_mut() {
            log.push(WriteRecord {
                dimension: dimension.clone(),
                pos,
                state,
                flags,
            });
        }
        true
    }

    fn set_sign_text(
        &mut self,
        dimension: &RegistryKey,
        pos: BlockPos,
        lines: [String; 4],
    ) -> bool {
        let key = (dimension.clone(), pos);
        if !self.blocks.contains_key(&key) {
            return false;
        }
        self.signs.insert(key, lines);
        true
    }
}
