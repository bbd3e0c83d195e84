//! Configuration management
//!
//! Handles TOML configuration parsing, validation and conversion into the
//! runtime `PollingConfiguration`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_POLLING_INTERVAL};
use crate::filter::validate_name_filters;
use crate::models::{validate_interval, PollingConfiguration};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfiguration {
    pub monitor: MonitorSettings,
    pub output: OutputSettings,
}

/// Polling behaviour
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorSettings {
    /// Polling interval in seconds (0.1-300.0)
    pub poll_interval: f64,
}

/// What is printed and how
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Emit one JSON object per line instead of human-readable text
    pub json: bool,
    /// Suppress the startup banner and shutdown message
    pub quiet: bool,
    /// Only report processes whose name matches one of these (empty = all)
    pub name_filters: Vec<String>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLLING_INTERVAL,
        }
    }
}

impl MonitorConfiguration {
    /// Load and validate a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the per-user configuration file if there is one
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/procwatch/config.toml`, if the platform has a config dir
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        validate_interval(self.monitor.poll_interval)?;
        validate_name_filters(&self.output.name_filters)?;
        Ok(())
    }

    pub fn to_polling_configuration(&self) -> Result<PollingConfiguration> {
        Ok(PollingConfiguration {
            interval: validate_interval(self.monitor.poll_interval)?,
            name_filters: self.output.name_filters.clone(),
            output_json: self.output.json,
            quiet_mode: self.output.quiet,
        })
    }
}
