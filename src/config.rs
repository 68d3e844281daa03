use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;
use voidworld_core::BlockPos;
use voidworld_world::{
    NamedBlockCatalog, SessionConfig, CHECK_INTERVAL, DEFAULT_CACHE_SIZE, DEFAULT_PROBE,
    DEFAULT_STRUCTURES_DIR,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/voidworld.toml";
const DEFAULT_EXPORT_PATH: &str = "config/voidworld/exported_locations.json";
/// One in-game hour at 20 ticks per second.
const DEFAULT_MAX_TICKS: u32 = 72_000;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VoidWorldConfig {
    /// Data-pack root holding a `locations/` tree, loaded at startup.
    pub data_dir: Option<PathBuf>,
    pub structures_dir: PathBuf,
    /// Target of `/vw location export` without an explicit path.
    pub export_path: PathBuf,
    pub structure_cache_size: usize,
    pub tracker: TrackerConfig,
    pub bootstrap: BootstrapConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Ticks between membership polls.
    pub check_interval: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// `[x, y, z]` cell that marks a dimension as already decorated.
    pub probe: [i32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub actor_name: String,
    /// Dimension alias or key the console actor starts in.
    pub start_dimension: String,
    /// Block identifiers added to the standard catalog.
    pub extra_blocks: Vec<String>,
    /// Upper bound on `/vw tick <count>`.
    pub max_ticks: u32,
}

impl Default for VoidWorldConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            structures_dir: PathBuf::from(DEFAULT_STRUCTURES_DIR),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            structure_cache_size: DEFAULT_CACHE_SIZE,
            tracker: TrackerConfig::default(),
            bootstrap: BootstrapConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            check_interval: CHECK_INTERVAL,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            probe: [DEFAULT_PROBE.x, DEFAULT_PROBE.y, DEFAULT_PROBE.z],
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            actor_name: "admin".to_string(),
            start_dimension: "overworld".to_string(),
            extra_blocks: Vec::new(),
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl VoidWorldConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<VoidWorldConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    VoidWorldConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                VoidWorldConfig::default()
            }
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        let [x, y, z] = self.bootstrap.probe;
        SessionConfig {
            data_dir: self.data_dir.clone(),
            structures_dir: self.structures_dir.clone(),
            structure_cache_size: self.structure_cache_size,
            check_interval: self.tracker.check_interval,
            bootstrap_probe: BlockPos::new(x, y, z),
        }
    }

    /// Standard catalog plus the configured extra blocks.
    pub fn block_catalog(&self) -> NamedBlockCatalog {
        let mut catalog = NamedBlockCatalog::standard();
        for block in &self.console.extra_blocks {
            catalog.insert(block.clone());
        }
        catalog
    }
}
