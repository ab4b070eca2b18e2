//! Configuration management for evtrack
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{Result, TrackerError};
use crate::logging::parse_log_level;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and under which keys the session and metadata records live
    pub storage: StorageConfig,

    /// Car shown when the stored metadata has none
    pub vehicle: VehicleDefaults,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Persistent store location and record keys
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON file per record key
    pub dir: String,

    /// Key of the active charging session record
    pub session_key: String,

    /// Key of the metadata record (car, last SOC, history)
    pub metadata_key: String,
}

/// Default vehicle metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleDefaults {
    /// Vehicle model name
    pub model: String,

    /// Registration plate
    pub reg: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level; falls back to `level`
    pub console_level: Option<String>,

    /// Optional file-specific level; falls back to `level`
    pub file_level: Option<String>,

    /// Path to log file or log directory
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to the console (stderr)
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "evtrack_config.yaml",
            "/data/evtrack_config.yaml",
            "/etc/evtrack/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.dir.trim().is_empty() {
            return Err(TrackerError::validation(
                "storage.dir",
                "Storage directory cannot be empty",
            ));
        }

        if self.storage.session_key.trim().is_empty() {
            return Err(TrackerError::validation(
                "storage.session_key",
                "Key cannot be empty",
            ));
        }

        if self.storage.metadata_key.trim().is_empty() {
            return Err(TrackerError::validation(
                "storage.metadata_key",
                "Key cannot be empty",
            ));
        }

        if self.storage.session_key == self.storage.metadata_key {
            return Err(TrackerError::validation(
                "storage.metadata_key",
                "Must differ from storage.session_key",
            ));
        }

        if self.vehicle.model.trim().is_empty() || self.vehicle.reg.trim().is_empty() {
            return Err(TrackerError::validation(
                "vehicle",
                "Default model and registration cannot be empty",
            ));
        }

        parse_log_level(&self.logging.level)?;

        Ok(())
    }
}
