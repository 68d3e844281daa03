//! Built-in catalog of scripted campaign regions, grouped by dimension.
//!
//! Overworld, top-down (north = -Z): the capital sits at the origin, the
//! village to its north-west, the four outer cities on the diagonals and the
//! shipwreck start area far north-west. The sky reaches float above the
//! capital at y 150+. Both custom dimensions are centred on (0, 0).

use voidworld_core::{BlockPos, RegistryKey};

use crate::location::{GameLocation, LocationType};

const FLOOR_Y: i32 = 63;
const HEIGHT: i32 = 40;

/// Compact source row for one built-in region.
struct Row {
    id: &'static str,
    corners: (i32, i32, i32, i32),
    y: i32,
    height: i32,
    kind: LocationType,
    protection: Option<&'static str>,
    tags: &'static [&'static str],
}

const fn row(
    id: &'static str,
    corners: (i32, i32, i32, i32),
    kind: LocationType,
    tags: &'static [&'static str],
) -> Row {
    Row {
        id,
        corners,
        y: FLOOR_Y,
        height: HEIGHT,
        kind,
        protection: None,
        tags,
    }
}

impl Row {
    const fn at(mut self, y: i32) -> Self {
        self.y = y;
        self
    }

    const fn tall(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    const fn protected(mut self, level: &'static str) -> Self {
        self.protection = Some(level);
        self
    }

    fn build(&self, dimension: &RegistryKey) -> GameLocation {
        let (x1, z1, x2, z2) = self.corners;
        let mut location = GameLocation::new(
            RegistryKey::voidworld(self.id),
            dimension.clone(),
            BlockPos::new(x1, self.y, z1),
            BlockPos::new(x2, self.y + self.height, z2),
            self.kind,
        );
        location.spawn_point = Some(BlockPos::new((x1 + x2) / 2, self.y + 1, (z1 + z2) / 2));
        location.protection_level = self.protection.map(str::to_string);
        location.tags = self.tags.iter().map(|t| t.to_string()).collect();
        location
    }
}

use LocationType::*;

const PROTECTED: &str = "PROTECTED";
const INDESTRUCTIBLE: &str = "INDESTRUCTIBLE";

const OVERWORLD: &[Row] = &[
    // Act 1
    row("shipwreck_beach", (-2300, -1900, -2100, -1700), Wilderness, &["starting_area", "act_1"]).at(60),
    row("jungle", (-2100, -1700, -1700, -1300), Wilderness, &["act_1", "traversal"]).at(60),
    row("cave", (-1700, -1300, -1400, -1000), Dungeon, &["act_1", "traversal"]).at(30).tall(30),
    row("valley", (-1400, -1000, -800, -600), Wilderness, &["act_1", "traversal"]).at(60),
    row("village", (-550, -550, -250, -250), City, &["act_1", "has_quests"]).protected(PROTECTED),
    row("village_square", (-450, -450, -350, -350), District, &["act_1"]),
    row("village_elder_house", (-500, -500, -460, -460), Building, &["act_1", "quest_npc"]),
    // Capital
    row("capital", (-400, -300, 400, 500), City, &["act_2", "main_city"]).protected(PROTECTED),
    row("capital_gate", (-50, -300, 50, -260), Building, &["act_2"]).protected(INDESTRUCTIBLE),
    row("capital_market", (-200, -200, 0, 0), District, &["act_2", "trading"]).protected(PROTECTED),
    row("capital_harbor", (100, -200, 350, 0), District, &["act_2"]).protected(PROTECTED),
    row("capital_residential", (-350, 0, -100, 200), District, &["act_2", "housing"]).protected(PROTECTED),
    row("capital_prison", (200, 100, 350, 250), Building, &["act_2", "prison"])
        .at(55)
        .tall(20)
        .protected(INDESTRUCTIBLE),
    row("capital_bank", (-100, -150, -50, -100), Building, &["act_2", "bank"]).protected(INDESTRUCTIBLE),
    // Castle
    row("castle", (-120, 200, 120, 500), Building, &["act_2", "act_3", "main_story"])
        .tall(120)
        .protected(INDESTRUCTIBLE),
    row("castle_entrance", (-40, 200, 40, 240), Room, &["act_2"]),
    row("castle_throne_room", (-60, 350, 60, 430), Room, &["act_3", "king"]).at(90),
    row("castle_tower_top", (-30, 420, 30, 480), Room, &["act_3", "void_breach", "boss"])
        .at(150)
        .tall(50),
    // Outer cities
    row("nocturn", (1000, 0, 1400, 400), City, &["gothic", "vampire", "campaign"]).protected(PROTECTED),
    row("nocturn_cathedral", (1150, 150, 1250, 250), Building, &["gothic"])
        .tall(60)
        .protected(INDESTRUCTIBLE),
    row("sandport", (600, 1000, 1000, 1400), City, &["desert", "trading", "campaign"])
        .at(68)
        .protected(PROTECTED),
    row("sandport_bazaar", (750, 1150, 850, 1250), District, &["desert", "trading"]).at(68),
    row("frosthold", (-1400, 600, -1000, 1000), City, &["snow", "mountain", "campaign"])
        .at(90)
        .protected(PROTECTED),
    row("mirewood", (-800, 1000, -400, 1400), City, &["swamp", "alchemy", "campaign"])
        .at(60)
        .protected(PROTECTED),
    row("aquaverde", (-200, -1400, 200, -1000), City, &["water", "venetian", "campaign"])
        .at(58)
        .protected(PROTECTED),
    row("sky_reaches", (-300, -200, 300, 200), Wilderness, &["floating", "sky", "campaign"])
        .at(150)
        .tall(80),
    row("pirate_cove", (-2000, -1000, -1600, -600), City, &["pirate", "islands", "campaign"])
        .at(60)
        .protected(PROTECTED),
    // Void cracks
    row("void_crack_1", (500, -500, 530, -470), VoidCrack, &["void", "dangerous"]).at(40).tall(80),
    row("void_crack_2", (-900, 300, -870, 330), VoidCrack, &["void", "dangerous"]).at(40).tall(80),
    row("void_crack_3", (1500, 600, 1530, 630), VoidCrack, &["void", "dangerous"]).at(40).tall(80),
];

const COSMIC: &[Row] = &[
    row("cosmic_main_platform", (-100, -100, 100, 100), Building, &["act_5", "cosmic"]).at(64),
    row("cosmic_lab", (-40, -80, 40, -20), Room, &["act_5", "research"]).at(64),
    row("cosmic_capsule_hall", (-80, 20, 80, 80), Room, &["act_5", "discovery"]).at(64),
    row("cosmic_demon_arena", (120, -60, 220, 60), SpawnZone, &["act_5", "combat", "boss"]).at(64),
    row("cosmic_teleporter", (-20, -20, 20, 20), TeleportPoint, &["act_5"]).at(64),
];

const NOOSPHERE: &[Row] = &[
    row("noo_landing", (-30, -30, 30, 30), TeleportPoint, &["act_5", "consciousness"]).at(64),
    row("noo_whispering_plains", (-200, -200, 200, 0), Wilderness, &["act_5", "talking_terrain"]).at(64),
    row("noo_frozen_city", (-150, 50, 150, 300), City, &["act_5", "absorbed_civilization"]).at(64),
    row("noo_core", (-40, 350, 40, 430), QuestArea, &["act_6", "final_choice", "endings"])
        .at(40)
        .tall(60),
];

/// Regions of one dimension, addressed by a short dimension name.
#[derive(Debug, Clone)]
pub struct LayoutDimension {
    /// Short name used by admin commands (`overworld`, `cosmic_platform`, ...).
    pub name: String,
    /// Host dimension key.
    pub dimension: RegistryKey,
    /// Regions in declaration order.
    pub locations: Vec<GameLocation>,
}

/// Ordered set of dimensions the bootstrapper knows how to decorate.
#[derive(Debug, Clone, Default)]
pub struct BootstrapLayout {
    dimensions: Vec<LayoutDimension>,
}

impl BootstrapLayout {
    /// Layout with no dimensions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The campaign layout: overworld, cosmic platform, consciousness planet.
    pub fn builtin() -> Self {
        let table: [(&str, RegistryKey, &[Row]); 3] = [
            ("overworld", RegistryKey::minecraft("overworld"), OVERWORLD),
            ("cosmic_platform", RegistryKey::voidworld("cosmic_platform"), COSMIC),
            ("consciousness_planet", RegistryKey::voidworld("consciousness_planet"), NOOSPHERE),
        ];
        table
            .into_iter()
            .fold(Self::empty(), |layout, (name, dimension, rows)| {
                let locations = rows.iter().map(|row| row.build(&dimension)).collect();
                layout.with_dimension(name, dimension, locations)
            })
    }

    /// Append a dimension. Lookups by name return the first match.
    pub fn with_dimension(
        mut self,
        name: impl Into<String>,
        dimension: RegistryKey,
        locations: Vec<GameLocation>,
    ) -> Self {
        self.dimensions.push(LayoutDimension {
            name: name.into(),
            dimension,
            locations,
        });
        self
    }

    /// Dimension entry by short name.
    pub fn dimension(&self, name: &str) -> Option<&LayoutDimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Dimension entries in bootstrap order.
    pub fn dimensions(&self) -> &[LayoutDimension] {
        &self.dimensions
    }

    /// Short names in bootstrap order.
    pub fn names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Every region across all dimensions.
    pub fn all(&self) -> impl Iterator<Item = &GameLocation> + '_ {
        self.dimensions.iter().flat_map(|d| d.locations.iter())
    }
}
