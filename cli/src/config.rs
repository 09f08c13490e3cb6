//! CLI configuration file (ballot.toml) support
//!
//! Example:
//! ```toml
//! [storage]
//! data_dir = "$HOME/.ballot"
//! snapshot = "ballot"
//!
//! [output]
//! json = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "ballot.toml";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_SNAPSHOT: &str = "ballot";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_snapshot")]
    pub snapshot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: default_data_dir(),
            snapshot: default_snapshot(),
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

fn default_snapshot() -> String {
    DEFAULT_SNAPSHOT.to_string()
}

impl Config {
    /// Load `path`, or fall back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Expand `$HOME` in a configured path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(path.replace("$HOME", &std::env::var("HOME").unwrap_or_default()))
}
