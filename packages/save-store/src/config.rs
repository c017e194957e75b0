//! Save store configuration.
//!
//! Supports TOML config files, environment variable overrides, and defaults.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SaveError;

/// Save store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Directory holding slot files (default: "./saves")
    pub save_dir: PathBuf,
    /// Number of addressable slots (default: 3)
    pub max_slots: usize,
    /// Slot file extension including the dot (default: ".ccsave")
    pub slot_extension: String,
    /// zlib compression level 0-9 (default: 9)
    pub compression_level: u32,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("./saves"),
            max_slots: 3,
            slot_extension: ".ccsave".to_string(),
            compression_level: 9,
        }
    }
}

impl SaveConfig {
    /// Creates a configuration rooted at `save_dir` with default values otherwise.
    pub fn with_save_dir(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            ..Default::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SaveError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SaveError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| SaveError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `CC_SAVE_DIR`, `CC_MAX_SLOTS` and `CC_COMPRESSION_LEVEL` overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), SaveError> {
        if let Ok(dir) = env::var("CC_SAVE_DIR") {
            self.save_dir = PathBuf::from(dir);
        }
        if let Ok(slots) = env::var("CC_MAX_SLOTS") {
            self.max_slots = slots
                .parse()
                .map_err(|_| SaveError::Config(format!("Invalid CC_MAX_SLOTS: {}", slots)))?;
        }
        if let Ok(level) = env::var("CC_COMPRESSION_LEVEL") {
            self.compression_level = level.parse().map_err(|_| {
                SaveError::Config(format!("Invalid CC_COMPRESSION_LEVEL: {}", level))
            })?;
        }
        self.validate()
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), SaveError> {
        if self.max_slots == 0 {
            return Err(SaveError::Config("max_slots must be at least 1".into()));
        }
        if self.max_slots > i32::MAX as usize {
            return Err(SaveError::Config(format!(
                "max_slots {} exceeds slot id range",
                self.max_slots
            )));
        }
        if self.compression_level > 9 {
            return Err(SaveError::Config(format!(
                "compression_level {} is outside 0-9",
                self.compression_level
            )));
        }
        Ok(())
    }
}
