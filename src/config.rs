use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::models::{CoordinateSpace, MarkerKind, DEFAULT_MARKER_COLOR};

const APP_NAME: &str = "nnav-bridge";
const CONFIG_FILE: &str = "config.json";
const CONFIG_ENV: &str = "NNAV_BRIDGE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// World space written into exported marker files.
    pub output_space: CoordinateSpace,
    /// Marker list schema used by `export`.
    pub output_kind: MarkerKind,
    /// Display color of exported markers.
    pub marker_color: String,
    /// Pretty-print position list JSON.
    pub pretty_json: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            output_space: CoordinateSpace::Ras,
            output_kind: MarkerKind::Instrument,
            marker_color: DEFAULT_MARKER_COLOR.to_string(),
            pretty_json: true,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from `$NNAV_BRIDGE_CONFIG` or the user's config directory.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
