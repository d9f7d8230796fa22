//! Front-end configuration, read from ~/.armory/config.json when present.

use crate::data::SelectionFilter;
use crate::enhancement::persistence::default_store_dir;
use crate::enhancement::types::AUTOPLAY_STEP_DELAY_MS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmoryConfig {
    /// Directory holding weapons.json and the two cost tables
    pub data_dir: PathBuf,

    /// Where the ledger is persisted (None = ~/.armory)
    pub store_dir: Option<PathBuf>,

    /// Pause between autoplay steps
    pub step_delay_ms: u64,

    /// Weapons offered for selection
    pub selection: SelectionFilter,
}

impl Default for ArmoryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store_dir: None,
            step_delay_ms: AUTOPLAY_STEP_DELAY_MS,
            selection: SelectionFilter::default(),
        }
    }
}

impl ArmoryConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Parse a config file. Missing fields keep their defaults; a missing or
    /// invalid file yields the full default.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Config from the default location.
    pub fn load() -> Self {
        match default_store_dir() {
            Ok(dir) => Self::load_from(&dir.join(CONFIG_FILE)),
            Err(_) => Self::default(),
        }
    }
}
