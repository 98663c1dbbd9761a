//! Configuration management for osqrun.
//!
//! Configuration is loaded from `~/.config/osqrun/config.toml`. Both values
//! can be overridden per-invocation from the command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the extension socket of the running daemon.
    #[serde(default = "default_socket")]
    pub socket: PathBuf,
    /// Query to run when none is given on the command line.
    #[serde(default = "default_query")]
    pub query: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: default_socket(),
            query: default_query(),
        }
    }
}

fn default_socket() -> PathBuf {
    PathBuf::from("/tmp/osquery.ext.sock")
}

fn default_query() -> String {
    "SELECT * FROM profile_items \
     WHERE profile_identifier = \"29998254-A289-4F30-B59C-A8CE1A9F570C\";"
        .to_string()
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("osqrun"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, using defaults if not found.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
