//! Named, typed, axis-aligned regions of a dimension and their flat record form.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use voidworld_core::{BlockPos, RegistryKey};

/// Role of a region in the campaign world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    /// An entire city or major settlement.
    City,
    /// A district within a city (market, residential, harbor, ...).
    District,
    /// A specific building (tavern, bank, prison, ...).
    Building,
    /// A dungeon or cave system.
    Dungeon,
    /// A room within a dungeon or building.
    Room,
    /// An outdoor region (jungle, valley, beach).
    Wilderness,
    /// A quest-specific area.
    QuestArea,
    /// A housing plot.
    HousingPlot,
    /// A crack into the void.
    VoidCrack,
    /// A protected subset of a city or building.
    ProtectedZone,
    /// A landmark, viewpoint or hidden cache.
    PointOfInterest,
    /// NPC patrol route waypoint.
    Waypoint,
    /// Spawn area for entities.
    SpawnZone,
    /// Teleport destination.
    TeleportPoint,
}

impl LocationType {
    /// Every type, in declaration order.
    pub const ALL: [LocationType; 14] = [
        LocationType::City,
        LocationType::District,
        LocationType::Building,
        LocationType::Dungeon,
        LocationType::Room,
        LocationType::Wilderness,
        LocationType::QuestArea,
        LocationType::HousingPlot,
        LocationType::VoidCrack,
        LocationType::ProtectedZone,
        LocationType::PointOfInterest,
        LocationType::Waypoint,
        LocationType::SpawnZone,
        LocationType::TeleportPoint,
    ];

    /// Persisted name (`CITY`, `QUEST_AREA`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            LocationType::City => "CITY",
            LocationType::District => "DISTRICT",
            LocationType::Building => "BUILDING",
            LocationType::Dungeon => "DUNGEON",
            LocationType::Room => "ROOM",
            LocationType::Wilderness => "WILDERNESS",
            LocationType::QuestArea => "QUEST_AREA",
            LocationType::HousingPlot => "HOUSING_PLOT",
            LocationType::VoidCrack => "VOID_CRACK",
            LocationType::ProtectedZone => "PROTECTED_ZONE",
            LocationType::PointOfInterest => "POINT_OF_INTEREST",
            LocationType::Waypoint => "WAYPOINT",
            LocationType::SpawnZone => "SPAWN_ZONE",
            LocationType::TeleportPoint => "TELEPORT_POINT",
        }
    }

    /// Comma-separated list of every persisted name.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parse a stored type name, degrading unknown names to
    /// [`LocationType::PointOfInterest`].
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or(LocationType::PointOfInterest)
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocationType {
    type Err = String;

    /// Case-insensitive match on the persisted name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| format!("unknown location type: {s}"))
    }
}

/// A named, bounded region in one dimension.
///
/// `min` and `max` are inclusive corners with `min <= max` on every axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLocation {
    /// Unique ID, e.g. `voidworld:capital_market`.
    pub id: RegistryKey,
    /// Localization key of the display name.
    pub name_key: String,
    /// Dimension the region lives in.
    pub dimension: RegistryKey,
    /// Minimum corner (inclusive).
    pub min: BlockPos,
    /// Maximum corner (inclusive).
    pub max: BlockPos,
    /// Role of the region.
    pub kind: LocationType,
    /// Advisory parent region; containment is not enforced.
    pub parent: Option<RegistryKey>,
    /// Free-form tags, kept sorted.
    pub tags: BTreeSet<String>,
    /// Teleport target override; the center is used when absent.
    pub spawn_point: Option<BlockPos>,
    /// Quests starting or active here. Referential only.
    pub associated_quests: Vec<RegistryKey>,
    /// NPCs stationed here. Referential only.
    pub associated_npcs: Vec<RegistryKey>,
    /// Law-system protection marker; absent or empty means unprotected.
    pub protection_level: Option<String>,
    /// Show the name overlay when an actor enters.
    pub notify_on_entry: bool,
    /// Ambient sound played while inside.
    pub ambient_sound: Option<RegistryKey>,
}

impl GameLocation {
    /// Region spanning the two raw corners (in any order) with default metadata.
    pub fn new(
        id: RegistryKey,
        dimension: RegistryKey,
        corner_a: BlockPos,
        corner_b: BlockPos,
        kind: LocationType,
    ) -> Self {
        let name_key = format!("location.{}.{}", id.namespace(), id.path());
        Self {
            id,
            name_key,
            dimension,
            min: corner_a.min(corner_b),
            max: corner_a.max(corner_b),
            kind,
            parent: None,
            tags: BTreeSet::new(),
            spawn_point: None,
            associated_quests: Vec::new(),
            associated_npcs: Vec::new(),
            protection_level: None,
            notify_on_entry: true,
            ambient_sound: None,
        }
    }

    /// Same region re-bounded by two raw corners in any order.
    pub fn with_bounds(mut self, corner_a: BlockPos, corner_b: BlockPos) -> Self {
        self.min = corner_a.min(corner_b);
        self.max = corner_a.max(corner_b);
        self
    }

    /// Geometric center (truncating midpoint per axis).
    pub fn center(&self) -> BlockPos {
        // The i64 midpoint of two i32 values always fits back into i32.
        let mid = |lo: i32, hi: i32| ((i64::from(lo) + i64::from(hi)) / 2) as i32;
        BlockPos::new(
            mid(self.min.x, self.max.x),
            mid(self.min.y, self.max.y),
            mid(self.min.z, self.max.z),
        )
    }

    /// Explicit spawn point, else the center.
    pub fn spawn_or_center(&self) -> BlockPos {
        self.spawn_point.unwrap_or_else(|| self.center())
    }

    /// Inclusive point containment on all six faces.
    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    /// Block count of the bounding box.
    pub fn volume(&self) -> u64 {
        let (dx, dy, dz) = self.size();
        dx.saturating_mul(dy).saturating_mul(dz)
    }

    /// Edge lengths in blocks along x, y and z.
    pub fn size(&self) -> (u64, u64, u64) {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1) as u64;
        (
            span(self.min.x, self.max.x),
            span(self.min.y, self.max.y),
            span(self.min.z, self.max.z),
        )
    }

    /// Horizontal footprint `(width, depth)` in blocks.
    pub fn footprint(&self) -> (u64, u64) {
        let (dx, _, dz) = self.size();
        (dx, dz)
    }

    /// Whether the law system treats this region as protected.
    pub fn is_protected(&self) -> bool {
        self.protection_level
            .as_deref()
            .is_some_and(|level| !level.is_empty())
    }

    /// Flat record for persistence.
    pub fn to_data(&self) -> LocationData {
        LocationData {
            id: self.id.to_string(),
            name_key: self.name_key.clone(),
            dimension: self.dimension.to_string(),
            min_x: self.min.x,
            min_y: self.min.y,
            min_z: self.min.z,
            max_x: self.max.x,
            max_y: self.max.y,
            max_z: self.max.z,
            kind: self.kind.name().to_string(),
            parent_id: self.parent.as_ref().map(ToString::to_string),
            tags: self.tags.iter().cloned().collect(),
            spawn_x: self.spawn_point.map(|p| p.x),
            spawn_y: self.spawn_point.map(|p| p.y),
            spawn_z: self.spawn_point.map(|p| p.z),
            associated_quests: self.associated_quests.iter().map(ToString::to_string).collect(),
            associated_npcs: self.associated_npcs.iter().map(ToString::to_string).collect(),
            protection_level: self.protection_level.clone(),
            show_entry_notification: self.notify_on_entry,
            ambient_sound: self.ambient_sound.as_ref().map(ToString::to_string),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Flat JSON record of a region, one per data-pack file or array element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub id: String,
    pub name_key: String,
    pub dimension: String,
    pub min_x: i32,
    pub min_y: i32,
    pub min_z: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub max_z: i32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_z: Option<i32>,
    #[serde(default)]
    pub associated_quests: Vec<String>,
    #[serde(default)]
    pub associated_npcs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_level: Option<String>,
    #[serde(default = "default_true")]
    pub show_entry_notification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_sound: Option<String>,
}

impl LocationData {
    /// Convert to a region, degrading malformed fields instead of rejecting
    /// the record.
    pub fn into_location(self) -> GameLocation {
        let id = RegistryKey::parse(&self.id).unwrap_or_else(|_| RegistryKey::voidworld("unknown"));
        let dimension = RegistryKey::parse_with_default_namespace(&self.dimension, "minecraft")
            .unwrap_or_else(|_| RegistryKey::minecraft("overworld"));
        let a = BlockPos::new(self.min_x, self.min_y, self.min_z);
        let b = BlockPos::new(self.max_x, self.max_y, self.max_z);
        let spawn_point = match (self.spawn_x, self.spawn_y, self.spawn_z) {
            (Some(x), Some(y), Some(z)) => Some(BlockPos::new(x, y, z)),
            _ => None,
        };
        let parse_keys = |raw: Vec<String>| -> Vec<RegistryKey> {
            raw.iter()
                .filter_map(|s| RegistryKey::parse(s).ok())
                .collect()
        };

        GameLocation {
            name_key: self.name_key,
            min: a.min(b),
            max: a.max(b),
            kind: LocationType::parse_lenient(&self.kind),
            parent: self.parent_id.and_then(|p| RegistryKey::parse(&p).ok()),
            tags: self.tags.into_iter().collect(),
            spawn_point,
            associated_quests: parse_keys(self.associated_quests),
            associated_npcs: parse_keys(self.associated_npcs),
            protection_level: self.protection_level,
            notify_on_entry: self.show_entry_notification,
            ambient_sound: self.ambient_sound.and_then(|s| RegistryKey::parse(&s).ok()),
            id,
            dimension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> GameLocation {
        GameLocation::new(
            RegistryKey::voidworld("market"),
            RegistryKey::minecraft("overworld"),
            BlockPos::new(10, 70, -5),
            BlockPos::new(0, 60, 5),
            LocationType::District,
        )
    }

    #[test]
    fn new_normalizes_corners() {
        let loc = region();
        assert_eq!(loc.min, BlockPos::new(0, 60, -5));
        assert_eq!(loc.max, BlockPos::new(10, 70, 5));
        assert_eq!(loc.name_key, "location.voidworld.market");
    }

    #[test]
    fn containment_is_inclusive_on_every_face() {
        let loc = region();
        assert!(loc.contains(loc.min));
        assert!(loc.contains(loc.max));
        assert!(!loc.contains(loc.min.offset(-1, 0, 0)));
        assert!(!loc.contains(loc.min.offset(0, -1, 0)));
        assert!(!loc.contains(loc.min.offset(0, 0, -1)));
        assert!(!loc.contains(loc.max.offset(1, 0, 0)));
        assert!(!loc.contains(loc.max.offset(0, 1, 0)));
        assert!(!loc.contains(loc.max.offset(0, 0, 1)));
    }

    #[test]
    fn center_volume_and_footprint() {
        let loc = region();
        assert_eq!(loc.center(), BlockPos::new(5, 65, 0));
        assert_eq!(loc.volume(), 11 * 11 * 11);
        assert_eq!(loc.footprint(), (11, 11));
        assert_eq!(loc.spawn_or_center(), loc.center());
    }

    #[test]
    fn center_of_regions_at_the_coordinate_extremes() {
        let wide = GameLocation::new(
            RegistryKey::voidworld("edge"),
            RegistryKey::minecraft("overworld"),
            BlockPos::new(i32::MAX - 10, i32::MAX, i32::MIN),
            BlockPos::new(i32::MAX, i32::MAX - 2, i32::MAX),
            LocationType::Wilderness,
        );
        assert_eq!(wide.center(), BlockPos::new(i32::MAX - 5, i32::MAX - 1, 0));
        assert_eq!(wide.size(), (11, 3, 1 << 32));
        assert_eq!(wide.volume(), 33 << 32);
    }

    #[test]
    fn protection_requires_non_empty_marker() {
        let mut loc = region();
        assert!(!loc.is_protected());
        loc.protection_level = Some(String::new());
        assert!(!loc.is_protected());
        loc.protection_level = Some("PROTECTED".into());
        assert!(loc.is_protected());
    }

    #[test]
    fn type_names_parse_case_insensitively() {
        assert_eq!("quest_area".parse::<LocationType>(), Ok(LocationType::QuestArea));
        assert_eq!("CITY".parse::<LocationType>(), Ok(LocationType::City));
        assert!("castle".parse::<LocationType>().is_err());
        assert_eq!(LocationType::parse_lenient("castle"), LocationType::PointOfInterest);
    }

    #[test]
    fn record_round_trip_keeps_metadata() {
        let mut loc = region();
        loc.tags.insert("trading".into());
        loc.spawn_point = Some(BlockPos::new(1, 61, 1));
        loc.protection_level = Some("PROTECTED".into());
        loc.associated_quests.push(RegistryKey::voidworld("first_steps"));
        loc.ambient_sound = Some(RegistryKey::voidworld("ambient.market"));

        let json = serde_json::to_string(&loc.to_data()).unwrap();
        assert!(json.contains("\"nameKey\""));
        assert!(json.contains("\"type\":\"DISTRICT\""));
        let back: LocationData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_location(), loc);
    }

    #[test]
    fn malformed_record_fields_degrade() {
        let json = r#"{
            "id": "Not A Key",
            "nameKey": "location.voidworld.odd",
            "dimension": "???",
            "minX": 5, "minY": 10, "minZ": 5,
            "maxX": 1, "maxY": 5, "maxZ": 2,
            "type": "CASTLE",
            "spawnX": 1, "spawnY": 2,
            "associatedNpcs": ["voidworld:guard", "Bad NPC"]
        }"#;
        let loc = serde_json::from_str::<LocationData>(json)
            .unwrap()
            .into_location();
        assert_eq!(loc.id, RegistryKey::voidworld("unknown"));
        assert_eq!(loc.dimension, RegistryKey::minecraft("overworld"));
        assert_eq!(loc.kind, LocationType::PointOfInterest);
        assert_eq!(loc.min, BlockPos::new(1, 5, 2));
        assert_eq!(loc.max, BlockPos::new(5, 10, 5));
        assert_eq!(loc.spawn_point, None);
        assert!(loc.notify_on_entry);
        assert_eq!(loc.associated_npcs, vec![RegistryKey::voidworld("guard")]);
    }
}
