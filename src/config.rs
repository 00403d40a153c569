//! Client configuration.
//!
//! Read from an optional YAML file; every field has a default so a missing
//! file or a partial one is fine.

use crate::session::Settings;
use crate::types::Priority;
use eyre::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default seconds a successful export notice stays up.
const DEFAULT_EXPORT_SAVED_SECS: u64 = 4;

/// Default seconds a failed export notice stays up.
const DEFAULT_EXPORT_FAILED_SECS: u64 = 3;

/// Settings loaded from `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Directory holding `.tally/` (default: current directory)
    pub root: Option<PathBuf>,

    /// Priority sent with new todos
    pub default_priority: Priority,

    /// Seconds "Saved as ..." stays visible
    pub export_saved_secs: u64,

    /// Seconds "Export failed!" stays visible
    pub export_failed_secs: u64,

    /// Where an auto-started daemon writes exports (default: ~/todo-exports)
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            default_priority: Priority::Medium,
            export_saved_secs: DEFAULT_EXPORT_SAVED_SECS,
            export_failed_secs: DEFAULT_EXPORT_FAILED_SECS,
            export_dir: None,
        }
    }
}

impl Config {
    /// Default config file location: `<config dir>/tally/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tally").join("config.yaml"))
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load from the default location, or defaults if there is none.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Store root, defaulting to the current directory.
    pub fn root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Export directory, defaulting to `~/todo-exports`.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("todo-exports")
        })
    }

    pub fn session_settings(&self) -> Settings {
        Settings {
            default_priority: self.default_priority,
            export_saved_ttl: Duration::from_secs(self.export_saved_secs),
            export_failed_ttl: Duration::from_secs(self.export_failed_secs),
        }
    }
}
