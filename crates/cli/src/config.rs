//! Optional configuration file with issuance defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Defaults {
    /// Total shares produced per split (n).
    #[serde(default = "default_shares")]
    pub shares: usize,

    /// Shares required to reconstruct (t).
    #[serde(default = "default_threshold")]
    pub threshold: usize,

    /// Certificate validity in days.
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            shares: default_shares(),
            threshold: default_threshold(),
            days: default_days(),
        }
    }
}

fn default_shares() -> usize {
    3
}
fn default_threshold() -> usize {
    2
}
fn default_days() -> u32 {
    365
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    fn load_default() -> Result<Self> {
        let candidates = [
            dirs::config_dir().map(|d| d.join("shardca").join("config.toml")),
            Some(PathBuf::from("shardca.toml")),
            Some(PathBuf::from(".shardca.toml")),
        ];

        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                return Self::load_from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
