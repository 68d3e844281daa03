//! Registry of every scripted region, indexed by ID and by chunk column.
//!
//! Lookups by ID are a map access. Lookups by position fetch the bucket of
//! the position's chunk and filter it by dimension and exact containment.
//! A region is listed in the bucket of every chunk its bounding box covers
//! and in no other bucket.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};
use voidworld_core::{chunk_key, BlockPos, RegistryKey};
use walkdir::WalkDir;

use crate::location::{GameLocation, LocationData, LocationType};

/// Default search radius for [`LocationRegistry::find_nearest`].
pub const DEFAULT_NEAREST_RADIUS: f64 = 256.0;

/// Errors raised while reading or writing region files.
#[derive(Debug, Error)]
pub enum LocationError {
    /// Filesystem failure.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON syntax or shape failure.
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of a batch load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Records registered.
    pub loaded: usize,
    /// Files skipped because they could not be read or parsed.
    pub failed: usize,
}

/// Owner of all registered regions.
#[derive(Debug, Default)]
pub struct LocationRegistry {
    locations: BTreeMap<RegistryKey, GameLocation>,
    chunk_index: HashMap<u64, Vec<RegistryKey>>,
}

impl LocationRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Region by ID.
    pub fn get(&self, id: &RegistryKey) -> Option<&GameLocation> {
        self.locations.get(id)
    }

    /// All regions in ID order.
    pub fn all(&self) -> impl Iterator<Item = &GameLocation> + '_ {
        self.locations.values()
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Regions in `dimension`, ID order.
    pub fn in_dimension(&self, dimension: &RegistryKey) -> Vec<&GameLocation> {
        self.locations
            .values()
            .filter(|loc| &loc.dimension == dimension)
            .collect()
    }

    /// Regions of `kind`, ID order.
    pub fn by_type(&self, kind: LocationType) -> Vec<&GameLocation> {
        self.locations
            .values()
            .filter(|loc| loc.kind == kind)
            .collect()
    }

    /// Regions containing `pos` in `dimension`. Overlapping regions are all
    /// returned, in bucket order.
    pub fn locations_at(&self, dimension: &RegistryKey, pos: BlockPos) -> Vec<&GameLocation> {
        let Some(bucket) = self.chunk_index.get(&pos.chunk().key()) else {
            return Vec::new();
        };
        bucket
            .iter()
            .filter_map(|id| self.locations.get(id))
            .filter(|loc| &loc.dimension == dimension && loc.contains(pos))
            .collect()
    }

    /// Whether `pos` lies inside any region of `kind`.
    pub fn is_in_location_type(
        &self,
        dimension: &RegistryKey,
        pos: BlockPos,
        kind: LocationType,
    ) -> bool {
        self.locations_at(dimension, pos)
            .iter()
            .any(|loc| loc.kind == kind)
    }

    /// Region whose center is closest to `pos`, within `max_distance` and
    /// optionally restricted to one type. Linear scan.
    pub fn find_nearest(
        &self,
        dimension: &RegistryKey,
        pos: BlockPos,
        max_distance: f64,
        kind: Option<LocationType>,
    ) -> Option<&GameLocation> {
        self.locations
            .values()
            .filter(|loc| &loc.dimension == dimension && kind.map_or(true, |k| loc.kind == k))
            .map(|loc| (loc.center().distance_to(pos), loc))
            .filter(|(distance, _)| *distance <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, loc)| loc)
    }

    /// IDs listed in the bucket of chunk `(cx, cz)`.
    pub fn chunk_bucket(&self, cx: i32, cz: i32) -> &[RegistryKey] {
        self.chunk_index
            .get(&chunk_key(cx, cz))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of non-empty chunk buckets.
    pub fn indexed_chunk_count(&self) -> usize {
        self.chunk_index.len()
    }

    /// Insert or replace a region by ID.
    pub fn register(&mut self, location: GameLocation) {
        if let Some(previous) = self.locations.remove(&location.id) {
            self.remove_from_index(&previous);
        }
        self.index_location(&location);
        debug!(id = %location.id, kind = %location.kind, "registered location");
        self.locations.insert(location.id.clone(), location);
    }

    /// Remove a region, returning it if it was registered.
    pub fn unregister(&mut self, id: &RegistryKey) -> Option<GameLocation> {
        let location = self.locations.remove(id)?;
        self.remove_from_index(&location);
        Some(location)
    }

    /// Drop every region and every index bucket.
    pub fn clear(&mut self) {
        self.locations.clear();
        self.chunk_index.clear();
    }

    /// Reload from a data-pack `locations/` tree: one JSON record per
    /// `*.json` file. Bad files are logged and skipped.
    pub fn load_data_dir(&mut self, root: &Path) -> LoadReport {
        self.clear();
        let mut report = LoadReport::default();

        if !root.is_dir() {
            warn!(path = %root.display(), "location data directory not found");
            return report;
        }

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("skipping unreadable entry under {}: {err}", root.display());
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        for path in files {
            match read_record(&path) {
                Ok(data) => {
                    let location = data.into_location();
                    debug!(id = %location.id, path = %path.display(), "loaded location");
                    self.register(location);
                    report.loaded += 1;
                }
                Err(err) => {
                    error!("Failed to load location: {err}");
                    report.failed += 1;
                }
            }
        }

        info!(
            loaded = report.loaded,
            failed = report.failed,
            "loaded locations from data packs"
        );
        report
    }

    /// Register every record of a JSON array file. A missing file is not
    /// an error and registers nothing.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, LocationError> {
        if !path.exists() {
            warn!(path = %path.display(), "location file not found");
            return Ok(0);
        }
        let contents = fs::read_to_string(path).map_err(|source| LocationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<LocationData> =
            serde_json::from_str(&contents).map_err(|source| LocationError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let count = records.len();
        for data in records {
            self.register(data.into_location());
        }
        info!(count, path = %path.display(), "loaded locations from file");
        Ok(count)
    }

    /// Write every region as a pretty JSON array, creating parent directories.
    pub fn export_file(&self, path: &Path) -> Result<usize, LocationError> {
        let records: Vec<LocationData> = self.locations.values().map(GameLocation::to_data).collect();
        let json = serde_json::to_string_pretty(&records).map_err(|source| LocationError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let io_err = |source| LocationError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        fs::write(path, json).map_err(io_err)?;
        info!(count = records.len(), path = %path.display(), "exported locations");
        Ok(records.len())
    }

    fn index_location(&mut self, location: &GameLocation) {
        for key in covered_chunk_keys(location) {
            self.chunk_index
                .entry(key)
                .or_default()
                .push(location.id.clone());
        }
    }

    // Walks the same rectangle as `index_location`.
    fn remove_from_index(&mut self, location: &GameLocation) {
        for key in covered_chunk_keys(location) {
            if let Some(bucket) = self.chunk_index.get_mut(&key) {
                bucket.retain(|id| id != &location.id);
                if bucket.is_empty() {
                    self.chunk_index.remove(&key);
                }
            }
        }
    }
}

fn covered_chunk_keys(location: &GameLocation) -> impl Iterator<Item = u64> {
    let min = location.min.chunk();
    let max = location.max.chunk();
    (min.x..=max.x).flat_map(move |cx| (min.z..=max.z).map(move |cz| chunk_key(cx, cz)))
}

fn read_record(path: &Path) -> Result<LocationData, LocationError> {
    let contents = fs::read_to_string(path).map_err(|source| LocationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LocationError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn overworld() -> RegistryKey {
        RegistryKey::minecraft("overworld")
    }

    fn loc(id: &str, a: (i32, i32, i32), b: (i32, i32, i32), kind: LocationType) -> GameLocation {
        GameLocation::new(
            RegistryKey::voidworld(id),
            overworld(),
            BlockPos::new(a.0, a.1, a.2),
            BlockPos::new(b.0, b.1, b.2),
            kind,
        )
    }

    fn temp_dir(label: &str) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("voidworld_{label}_{timestamp}"));
        fs::create_dir_all(&dir).expect("temp dir create");
        dir
    }

    #[test]
    fn nested_regions_are_both_reported() {
        let mut registry = LocationRegistry::new();
        registry.register(loc("capital", (-400, 63, -300), (400, 103, 500), LocationType::City));
        registry.register(loc("market", (-200, 63, -200), (0, 103, 0), LocationType::District));

        let here = registry.locations_at(&overworld(), BlockPos::new(-100, 70, -100));
        let ids: Vec<_> = here.iter().map(|l| l.id.path()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"capital"));
        assert!(ids.contains(&"market"));
        assert!(registry.is_in_location_type(
            &overworld(),
            BlockPos::new(-100, 70, -100),
            LocationType::District
        ));
    }

    #[test]
    fn dimension_must_match() {
        let mut registry = LocationRegistry::new();
        registry.register(loc("plaza", (0, 0, 0), (10, 10, 10), LocationType::District));
        let end = RegistryKey::minecraft("the_end");
        assert!(registry.locations_at(&end, BlockPos::new(5, 5, 5)).is_empty());
        assert_eq!(registry.locations_at(&overworld(), BlockPos::new(5, 5, 5)).len(), 1);
    }

    #[test]
    fn index_spans_negative_chunks() {
        let mut registry = LocationRegistry::new();
        registry.register(loc("crossing", (-17, 0, -1), (16, 5, 0), LocationType::Waypoint));
        for cx in -2..=1 {
            for cz in -1..=0 {
                assert_eq!(registry.chunk_bucket(cx, cz).len(), 1, "chunk ({cx},{cz})");
            }
        }
        assert!(registry.chunk_bucket(2, 0).is_empty());
        assert!(registry.chunk_bucket(-3, 0).is_empty());
        assert_eq!(registry.indexed_chunk_count(), 8);
    }

    #[test]
    fn unregister_clears_every_bucket() {
        let mut registry = LocationRegistry::new();
        registry.register(loc("plaza", (0, 0, 0), (40, 10, 40), LocationType::District));
        assert!(registry.unregister(&RegistryKey::voidworld("plaza")).is_some());
        assert_eq!(registry.indexed_chunk_count(), 0);
        assert!(registry.unregister(&RegistryKey::voidworld("plaza")).is_none());
        assert!(registry.get(&RegistryKey::voidworld("plaza")).is_none());
    }

    #[test]
    fn reregistering_moves_the_index() {
        let mut registry = LocationRegistry::new();
        registry.register(loc("camp", (0, 0, 0), (5, 5, 5), LocationType::Wilderness));
        registry.register(loc("camp", (100, 0, 100), (105, 5, 105), LocationType::Wilderness));

        assert_eq!(registry.len(), 1);
        assert!(registry.chunk_bucket(0, 0).is_empty());
        assert_eq!(registry.chunk_bucket(6, 6).len(), 1);
        assert!(registry.locations_at(&overworld(), BlockPos::new(1, 1, 1)).is_empty());
    }

    #[test]
    fn find_nearest_honours_radius_and_type() {
        let mut registry = LocationRegistry::new();
        registry.register(loc("near", (0, 64, 0), (10, 64, 10), LocationType::Building));
        registry.register(loc("far", (300, 64, 300), (310, 64, 310), LocationType::Building));
        registry.register(loc("poi", (20, 64, 20), (22, 64, 22), LocationType::PointOfInterest));

        let origin = BlockPos::new(0, 64, 0);
        let nearest = registry
            .find_nearest(&overworld(), origin, DEFAULT_NEAREST_RADIUS, None)
            .unwrap();
        assert_eq!(nearest.id.path(), "near");

        let poi = registry
            .find_nearest(&overworld(), origin, DEFAULT_NEAREST_RADIUS, Some(LocationType::PointOfInterest))
            .unwrap();
        assert_eq!(poi.id.path(), "poi");

        assert!(registry
            .find_nearest(&overworld(), BlockPos::new(1000, 64, 1000), 10.0, None)
            .is_none());
    }

    #[test]
    fn clear_empties_both_maps() {
        let mut registry = LocationRegistry::new();
        registry.register(loc("a", (0, 0, 0), (100, 0, 100), LocationType::City));
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.indexed_chunk_count(), 0);
    }

    #[test]
    fn export_then_load_file_restores_regions() {
        let dir = temp_dir("export");
        let path = dir.join("nested").join("exported_locations.json");

        let mut registry = LocationRegistry::new();
        registry.register(loc("a", (0, 0, 0), (5, 5, 5), LocationType::Room));
        registry.register(loc("b", (10, 0, 10), (20, 5, 20), LocationType::Dungeon));
        assert_eq!(registry.export_file(&path).unwrap(), 2);

        let mut reloaded = LocationRegistry::new();
        assert_eq!(reloaded.load_file(&path).unwrap(), 2);
        assert_eq!(reloaded.get(&RegistryKey::voidworld("b")), registry.get(&RegistryKey::voidworld("b")));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_loads_nothing() {
        let mut registry = LocationRegistry::new();
        let path = std::env::temp_dir().join("voidworld_definitely_missing.json");
        assert_eq!(registry.load_file(&path).unwrap(), 0);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = temp_dir("malformed");
        let path = dir.join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let mut registry = LocationRegistry::new();
        assert!(matches!(registry.load_file(&path), Err(LocationError::Json { .. })));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn data_dir_skips_bad_records() {
        let dir = temp_dir("datapack");
        let nested = dir.join("capital");
        fs::create_dir_all(&nested).unwrap();

        let good = serde_json::to_string(
            &loc("market", (0, 0, 0), (5, 5, 5), LocationType::District).to_data(),
        )
        .unwrap();
        fs::write(nested.join("market.json"), good).unwrap();
        fs::write(dir.join("broken.json"), "[]").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut registry = LocationRegistry::new();
        registry.register(loc("stale", (0, 0, 0), (1, 1, 1), LocationType::Room));
        let report = registry.load_data_dir(&dir);
        assert_eq!(report, LoadReport { loaded: 1, failed: 1 });
        assert!(registry.get(&RegistryKey::voidworld("stale")).is_none());
        assert!(registry.get(&RegistryKey::voidworld("market")).is_some());

        let _ = fs::remove_dir_all(&dir);
    }
}
