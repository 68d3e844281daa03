//! Placeable structure definitions and the file-backed catalog that serves them.
//!
//! A structure file lives at `<root>/<id>.json`:
//!
//! ```json
//! {
//!   "name": "House City Standard",
//!   "blocks": [
//!     { "type": "minecraft:oak_planks", "relativePosition": [0, 0, 0] }
//!   ],
//!   "blockImage": "voidworld:block/structure_house_icon"
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default structure catalog directory.
pub const DEFAULT_STRUCTURES_DIR: &str = "data/voidworld/structures";

/// Default number of parsed definitions kept in memory.
pub const DEFAULT_CACHE_SIZE: usize = 32;

/// One block of a structure: identifier, offset from the origin and optional state properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureBlockEntry {
    /// Block identifier such as `minecraft:stone_bricks`.
    #[serde(rename = "type")]
    pub block: String,
    /// `[dx, dy, dz]`; missing components read as 0.
    #[serde(rename = "relativePosition")]
    pub relative_position: Vec<i32>,
    /// Block-state properties applied on placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
}

impl StructureBlockEntry {
    /// Entry at `(dx, dy, dz)` without properties.
    pub fn new(block: impl Into<String>, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            block: block.into(),
            relative_position: vec![dx, dy, dz],
            properties: None,
        }
    }

    /// Offset triple.
    pub fn offset(&self) -> (i32, i32, i32) {
        let at = |i: usize| self.relative_position.get(i).copied().unwrap_or(0);
        (at(0), at(1), at(2))
    }
}

/// Named, ordered block list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDefinition {
    /// Display name.
    pub name: String,
    /// Entries in placement order.
    pub blocks: Vec<StructureBlockEntry>,
    /// Icon reference for item/GUI rendering.
    #[serde(
        rename = "blockImage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub block_image: Option<String>,
}

impl StructureDefinition {
    /// Per-axis minimum and maximum offsets, or `None` for an empty structure.
    pub fn bounds(&self) -> Option<((i32, i32, i32), (i32, i32, i32))> {
        let mut offsets = self.blocks.iter().map(StructureBlockEntry::offset);
        let first = offsets.next()?;
        Some(offsets.fold((first, first), |(lo, hi), (x, y, z)| {
            (
                (lo.0.min(x), lo.1.min(y), lo.2.min(z)),
                (hi.0.max(x), hi.1.max(y), hi.2.max(z)),
            )
        }))
    }

    /// Pretty JSON in the on-disk format.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Failures loading a structure file.
#[derive(Debug, Error)]
pub enum StructureError {
    /// The ID contains characters outside `[a-z0-9_-]`.
    #[error("invalid structure id: {0:?}")]
    InvalidId(String),
    /// No file for the ID.
    #[error("structure {id} not found at {}", path.display())]
    NotFound {
        /// Requested ID.
        id: String,
        /// Path probed.
        path: PathBuf,
    },
    /// Filesystem failure.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// JSON syntax or shape failure.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Whether `id` may name a structure file.
pub fn is_valid_structure_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-'))
}

/// Catalog of structure files under one directory, with an LRU of parsed definitions.
pub struct StructureLoader {
    root: PathBuf,
    cache: LruCache<String, Arc<StructureDefinition>>,
}

impl StructureLoader {
    /// Catalog rooted at `root`, caching up to `cache_size` definitions (at least 1).
    pub fn new(root: impl Into<PathBuf>, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            root: root.into(),
            cache: LruCache::new(capacity),
        }
    }

    /// Catalog directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `id`.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Load `id`, logging and returning `None` on any failure.
    pub fn load(&mut self, id: &str) -> Option<Arc<StructureDefinition>> {
        match self.try_load(id) {
            Ok(definition) => Some(definition),
            Err(err) => {
                warn!("Failed to load structure {id}: {err}");
                None
            }
        }
    }

    /// Load `id`, serving repeated requests from the cache.
    pub fn try_load(&mut self, id: &str) -> Result<Arc<StructureDefinition>, StructureError> {
        if !is_valid_structure_id(id) {
            return Err(StructureError::InvalidId(id.to_string()));
        }
        if let Some(definition) = self.cache.get(id) {
            return Ok(Arc::clone(definition));
        }

        let path = self.path_for(id);
        if !path.is_file() {
            return Err(StructureError::NotFound {
                id: id.to_string(),
                path,
            });
        }
        let contents = fs::read_to_string(&path).map_err(|source| StructureError::Io {
            path: path.clone(),
            source,
        })?;
        let definition: StructureDefinition =
            serde_json::from_str(&contents).map_err(|source| StructureError::Json {
                path: path.clone(),
                source,
            })?;

        debug!(id, blocks = definition.blocks.len(), "loaded structure");
        let definition = Arc::new(definition);
        self.cache.put(id.to_string(), Arc::clone(&definition));
        Ok(definition)
    }

    /// Drop every cached definition so edited files are re-read.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Number of cached definitions.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Sorted IDs of the `*.json` files directly under the root.
    pub fn available_ids(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(root = %self.root.display(), "structure directory unreadable: {err}");
                return Vec::new();
            }
        };

        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .filter(|id| is_valid_structure_id(id))
            .collect();
        ids.sort();
        ids
    }
}
