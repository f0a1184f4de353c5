//! Configuration loader and validator
//!
//! Loads bridge configuration from TOML files in the configs/ directory.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::joycon::controller::DEFAULT_STATUS_QUEUE_CAPACITY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Device identity asset location
    #[serde(default)]
    pub device: DeviceSettings,

    /// Engine binding settings
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Where the device identity/calibration blob lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Directory assets are resolved against
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,

    /// Blob path, relative to `asset_root`
    #[serde(default = "default_asset_path")]
    pub asset_path: PathBuf,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            asset_path: default_asset_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Status reports the engine may queue before they are dropped
    #[serde(default = "default_status_queue_capacity")]
    pub status_queue_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            status_queue_capacity: default_status_queue_capacity(),
        }
    }
}

fn default_asset_root() -> PathBuf { PathBuf::from("assets") }
fn default_asset_path() -> PathBuf { PathBuf::from("joycon_right.bin") }
fn default_status_queue_capacity() -> usize { DEFAULT_STATUS_QUEUE_CAPACITY }

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        info!("Loading configuration from: {}", path_ref.display());

        let content = std::fs::read_to_string(path_ref)?;
        let config = Self::from_toml(&content)?;

        info!("✓ Config validation passed");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;

        debug!("  - Asset root: {}", config.device.asset_root.display());
        debug!("  - Asset path: {}", config.device.asset_path.display());
        debug!("  - Status queue: {}", config.engine.status_queue_capacity);

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from configs/default.toml
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load("configs/default.toml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let asset = &self.device.asset_path;
        if asset.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("device.asset_path must not be empty".into()));
        }

        if asset.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "device.asset_path '{}' must be relative to asset_root",
                asset.display()
            )));
        }

        if asset.components().any(|c| c == Component::ParentDir) {
            return Err(ConfigError::Invalid(format!(
                "device.asset_path '{}' must not leave asset_root",
                asset.display()
            )));
        }

        if self.engine.status_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "engine.status_queue_capacity must be at least 1".into()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = Config::default();
        assert_eq!(config.device.asset_root, PathBuf::from("assets"));
        assert_eq!(config.device.asset_path, PathBuf::from("joycon_right.bin"));
        assert_eq!(config.engine.status_queue_capacity, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_valid_config_minimal() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.engine.status_queue_capacity, 32);
    }

    #[test]
    fn test_valid_config_full() {
        let toml_str = r#"
            [device]
            asset_root = "/opt/joycon"
            asset_path = "left/identity.bin"

            [engine]
            status_queue_capacity = 4
        "#;
        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.device.asset_path, PathBuf::from("left/identity.bin"));
        assert_eq!(config.engine.status_queue_capacity, 4);
    }

    #[test]
    fn test_invalid_queue_capacity() {
        let toml_str = r#"
            [engine]
            status_queue_capacity = 0
        "#;
        let err = Config::from_toml(toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_asset_path_must_stay_under_root() {
        for bad in ["", "../secret.bin", "a/../../b.bin"] {
            let toml_str = format!("[device]\nasset_path = \"{}\"\n", bad);
            let result = Config::from_toml(&toml_str);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "accepted '{}'", bad);
        }
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_toml("[engine]\nstatus_queue_capacity = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[device]\nasset_path = \"pro.bin\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.device.asset_path, PathBuf::from("pro.bin"));
        assert!(matches!(Config::load(dir.path().join("nope.toml")), Err(ConfigError::Io(_))));
    }
}
