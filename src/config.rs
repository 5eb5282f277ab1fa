//! Configuration loading with defaults.
//!
//! Read from `.statusflow/config.json`. Missing file or missing fields fall
//! back to the defaults below.

use crate::engine::db::DB_DIR;
use crate::engine::order::RelationOrder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Persist every applied status change immediately.
    #[serde(default = "default_auto_persist")]
    pub auto_persist_on_transition: bool,
    #[serde(default)]
    pub relation_order: RelationOrder,
    /// Default filter when `STATUSFLOW_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_auto_persist() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_persist_on_transition: default_auto_persist(),
            relation_order: RelationOrder::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn path(root: &Path) -> PathBuf {
        root.join(DB_DIR).join(CONFIG_FILE)
    }

    /// Loads the configuration under `root`, or defaults if there is none.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Writes the configuration under `root`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = Self::path(root);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}
