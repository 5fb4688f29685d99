//! Configuration management for the regdomain controller.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub regulatory: RegulatoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_interfaces")]
    pub interfaces: Vec<String>,
}

/// Fixed inputs of the country code controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatoryConfig {
    /// Fallback code used until (or instead of) a telephony-supplied one
    pub default_country_code: String,
    /// Fall back to the default when telephony withdraws its value
    #[serde(default = "default_revert_on_loss")]
    pub revert_on_loss: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human readable format
    #[serde(default)]
    pub json: bool,
}

fn default_revert_on_loss() -> bool {
    true
}

fn default_interfaces() -> Vec<String> {
    vec!["wlan0".to_string()]
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            regulatory: RegulatoryConfig {
                default_country_code: "US".to_string(),
                revert_on_loss: true,
            },
            logging: LoggingConfig::default(),
            interfaces: default_interfaces(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.regulatory.default_country_code.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "regulatory.default_country_code must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
