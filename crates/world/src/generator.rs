//! Procedural structure archetypes.
//!
//! Every archetype is a box lattice whose cells are classified by a fixed
//! sequence of geometric predicates. [`generate`] walks the lattice (y outer,
//! then z, then x), emits one entry per classified cell and appends the
//! archetype's torch decorations afterwards.

use std::fmt;
use std::str::FromStr;

use crate::structure::{StructureBlockEntry, StructureDefinition};

const STONE_BRICKS: &str = "minecraft:stone_bricks";
const STONE_BRICK_SLAB: &str = "minecraft:stone_brick_slab";
const GLASS_PANE: &str = "minecraft:glass_pane";
const AIR: &str = "minecraft:air";
const TORCH: &str = "minecraft:torch";

/// Icon shared by the generated structures.
pub const GENERATED_BLOCK_IMAGE: &str = "minecraft:block/stone_bricks";

/// Role of one lattice cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Solid bottom layer.
    Foundation,
    /// Solid outer wall.
    Wall,
    /// Glazed opening in a wall.
    Window,
    /// Raised block of a crenellated top.
    Merlon,
    /// Gap of a crenellated top.
    Crenel,
    /// Door or corridor opening.
    Opening,
    /// Slab floor or roof.
    Slab,
    /// Empty interior.
    Interior,
}

impl Cell {
    /// Block identifier written for the cell.
    pub const fn block(self) -> &'static str {
        match self {
            Cell::Foundation | Cell::Wall | Cell::Merlon => STONE_BRICKS,
            Cell::Window => GLASS_PANE,
            Cell::Slab => STONE_BRICK_SLAB,
            Cell::Crenel | Cell::Opening | Cell::Interior => AIR,
        }
    }
}

/// Built-in building archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// 7×7 footprint, 14 high, windows mid-face, crenellated top.
    CastleTower,
    /// 20 wide, 3 deep, 8 high, merlons on the walkway.
    FortressWall,
    /// 9×9 footprint, y 0..=9, alternating slab floors around a corridor cross.
    LargeBuilding,
}

impl Archetype {
    /// Every archetype.
    pub const ALL: [Archetype; 3] = [
        Archetype::CastleTower,
        Archetype::FortressWall,
        Archetype::LargeBuilding,
    ];

    /// Structure ID (also the output file stem).
    pub const fn id(self) -> &'static str {
        match self {
            Archetype::CastleTower => "tower_castle",
            Archetype::FortressWall => "wall_fortress",
            Archetype::LargeBuilding => "building_large",
        }
    }

    /// Display name stored in the definition.
    pub const fn display_name(self) -> &'static str {
        match self {
            Archetype::CastleTower => "Castle Tower",
            Archetype::FortressWall => "Fortress Wall",
            Archetype::LargeBuilding => "Large Multi-Floor Building",
        }
    }

    /// Lattice extent `(width, height, depth)` along x, y and z.
    pub const fn size(self) -> (i32, i32, i32) {
        match self {
            Archetype::CastleTower => (tower::SIZE, tower::HEIGHT, tower::SIZE),
            Archetype::FortressWall => (wall::WIDTH, wall::HEIGHT, wall::DEPTH),
            Archetype::LargeBuilding => (building::SIZE, building::HEIGHT, building::SIZE),
        }
    }

    /// Classify one lattice cell. `None` leaves the cell out of the output.
    pub fn classify(self, x: i32, y: i32, z: i32) -> Option<Cell> {
        match self {
            Archetype::CastleTower => Some(tower::classify(x, y, z)),
            Archetype::FortressWall => Some(wall::classify(x, y)),
            Archetype::LargeBuilding => building::classify(x, y, z),
        }
    }

    /// Torch positions appended after the lattice walk.
    pub fn decorations(self) -> Vec<(i32, i32, i32)> {
        match self {
            Archetype::CastleTower => tower::torches(),
            Archetype::FortressWall => wall::torches(),
            Archetype::LargeBuilding => building::torches(),
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Archetype {
    type Err = String;

    /// Accepts the structure ID or a short alias (`tower`, `wall`, `building`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tower_castle" | "tower" | "castle_tower" => Ok(Archetype::CastleTower),
            "wall_fortress" | "wall" | "fortress_wall" => Ok(Archetype::FortressWall),
            "building_large" | "building" | "large_building" => Ok(Archetype::LargeBuilding),
            other => Err(format!("unknown archetype: {other}")),
        }
    }
}

/// Build the structure definition for `archetype`.
pub fn generate(archetype: Archetype) -> StructureDefinition {
    let (width, height, depth) = archetype.size();
    let mut blocks = Vec::new();

    for y in 0..height {
        for z in 0..depth {
            for x in 0..width {
                if let Some(cell) = archetype.classify(x, y, z) {
                    blocks.push(StructureBlockEntry::new(cell.block(), x, y, z));
                }
            }
        }
    }

    blocks.extend(
        archetype
            .decorations()
            .into_iter()
            .map(|(x, y, z)| StructureBlockEntry::new(TORCH, x, y, z)),
    );

    StructureDefinition {
        name: archetype.display_name().to_string(),
        blocks,
        block_image: Some(GENERATED_BLOCK_IMAGE.to_string()),
    }
}

mod tower {
    use super::Cell;

    pub(super) const SIZE: i32 = 7;
    pub(super) const HEIGHT: i32 = 14;

    fn is_wall(x: i32, z: i32) -> bool {
        x == 0 || x == SIZE - 1 || z == 0 || z == SIZE - 1
    }

    fn is_window(x: i32, y: i32, z: i32) -> bool {
        if !(2..=HEIGHT - 3).contains(&y) || !is_wall(x, z) {
            return false;
        }
        let mid = SIZE / 2;
        (x == mid && (z == 0 || z == SIZE - 1)) || (z == mid && (x == 0 || x == SIZE - 1))
    }

    pub(super) fn classify(x: i32, y: i32, z: i32) -> Cell {
        if y == 0 {
            Cell::Foundation
        } else if y == HEIGHT - 1 {
            match (is_wall(x, z), (x + z) % 2 == 0) {
                (true, true) => Cell::Merlon,
                (true, false) => Cell::Crenel,
                (false, _) => Cell::Slab,
            }
        } else if is_wall(x, z) {
            if is_window(x, y, z) {
                Cell::Window
            } else {
                Cell::Wall
            }
        } else {
            Cell::Interior
        }
    }

    pub(super) fn torches() -> Vec<(i32, i32, i32)> {
        (2..HEIGHT - 1)
            .step_by(3)
            .flat_map(|y| {
                [(2, 2), (4, 2), (2, 4), (4, 4), (3, 3)]
                    .into_iter()
                    .map(move |(x, z)| (x, y, z))
            })
            .collect()
    }
}

mod wall {
    use super::Cell;

    pub(super) const WIDTH: i32 = 20;
    pub(super) const DEPTH: i32 = 3;
    pub(super) const HEIGHT: i32 = 8;

    pub(super) fn classify(x: i32, y: i32) -> Cell {
        if y == HEIGHT - 1 {
            if (x + 1) % 2 == 0 {
                Cell::Merlon
            } else {
                Cell::Crenel
            }
        } else {
            Cell::Wall
        }
    }

    pub(super) fn torches() -> Vec<(i32, i32, i32)> {
        (2..WIDTH).step_by(4).map(|x| (x, 6, 1)).collect()
    }
}

mod building {
    use super::Cell;

    pub(super) const SIZE: i32 = 9;
    pub(super) const HEIGHT: i32 = 10;
    const ROOF: i32 = HEIGHT - 1;

    fn is_wall(x: i32, z: i32) -> bool {
        x == 0 || x == SIZE - 1 || z == 0 || z == SIZE - 1
    }

    fn is_interior(x: i32, z: i32) -> bool {
        (1..=SIZE - 2).contains(&x) && (1..=SIZE - 2).contains(&z)
    }

    fn is_main_door(x: i32, y: i32, z: i32) -> bool {
        x == 4 && z == 0 && y == 1
    }

    fn is_corridor_opening(x: i32, y: i32, z: i32) -> bool {
        (1..=7).contains(&y) && ((x == 4 && (z == 2 || z == 6)) || (z == 4 && (x == 2 || x == 6)))
    }

    fn is_window(x: i32, y: i32, z: i32) -> bool {
        (1..=7).contains(&y) && is_wall(x, z) && (x == 2 || x == 6 || z == 2 || z == 6)
    }

    // The main door must be tested before the wall predicate.
    pub(super) fn classify(x: i32, y: i32, z: i32) -> Option<Cell> {
        if y == 0 {
            Some(Cell::Foundation)
        } else if y == ROOF {
            Some(Cell::Slab)
        } else if is_main_door(x, y, z) {
            Some(Cell::Opening)
        } else if is_wall(x, z) {
            Some(if is_window(x, y, z) { Cell::Window } else { Cell::Wall })
        } else if is_interior(x, z) {
            Some(if is_corridor_opening(x, y, z) {
                Cell::Opening
            } else if y % 2 == 1 {
                Cell::Slab
            } else {
                Cell::Interior
            })
        } else {
            None
        }
    }

    pub(super) fn torches() -> Vec<(i32, i32, i32)> {
        (1..=7)
            .step_by(2)
            .flat_map(|y| {
                [(2, 2), (6, 2), (2, 6), (6, 6)]
                    .into_iter()
                    .map(move |(x, z)| (x, y + 1, z))
            })
            .collect()
    }
}
