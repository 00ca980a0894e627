//! Arbor configuration
//!
//! Path syntax and the drives to mount. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SEPARATOR: char = '\\';

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArborConfig {
    /// Path syntax shared by every drive.
    pub path: PathConfig,
    /// Drives to mount, in declaration order.
    pub drives: Vec<DriveConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// The single reserved separator character.
    pub separator: char,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    pub name: String,
    pub backend: BackendConfig,
}

/// Which adapter backs a drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Dictionary store. Tables in `seed` become containers, any other value a leaf.
    Memory {
        #[serde(default = "empty_table")]
        seed: serde_json::Value,
    },
    /// Host directory store rooted at `root`.
    Directory { root: PathBuf },
}

fn empty_table() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

// ============================================================
// Loading
// ============================================================

impl ArborConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {} - using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parse a TOML document without falling back.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Write the current config as TOML (for generating a default config file).
    /// Fails for seeds TOML cannot express, such as null values.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
