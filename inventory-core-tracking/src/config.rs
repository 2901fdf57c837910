//! Tracking configuration
//!
//! Every value has a default, so an empty TOML document is a valid
//! configuration. Only the sections that differ need to be written:
//!
//! ```toml
//! module_name = "Equipos"
//!
//! [guard]
//! reminder_interval_secs = 120
//! origin = "https://inventario.example.com"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid tracking config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid tracking config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Screen name written into every change-log entry
    pub module_name: String,
    pub batch: BatchConfig,
    pub indicators: IndicatorConfig,
    pub guard: GuardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of pending changes shown as a full progress bar
    pub progress_full_at: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Most recent history rows kept per field
    pub max_per_field: usize,
    /// Records whose history is kept in memory
    pub cache_capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub reminder_interval_secs: u64,
    pub refocus_debounce_ms: u64,
    pub reminder_cooldown_secs: u64,
    /// Origin used to recognise absolute links into the application
    pub origin: Option<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            module_name: "Inventario".to_string(),
            batch: BatchConfig::default(),
            indicators: IndicatorConfig::default(),
            guard: GuardConfig::default(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { progress_full_at: 10 }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            max_per_field: 10,
            cache_capacity: 10_000,
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            reminder_interval_secs: 180,
            refocus_debounce_ms: 1_000,
            reminder_cooldown_secs: 5,
            origin: None,
        }
    }
}

impl TrackingConfig {
    pub fn for_module(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.trim().is_empty() {
            return Err(ConfigError::Invalid("module_name must not be empty".to_string()));
        }
        if self.batch.progress_full_at == 0 {
            return Err(ConfigError::Invalid("batch.progress_full_at must be at least 1".to_string()));
        }
        if self.indicators.max_per_field == 0 {
            return Err(ConfigError::Invalid("indicators.max_per_field must be at least 1".to_string()));
        }
        if self.guard.reminder_interval_secs == 0 {
            return Err(ConfigError::Invalid("guard.reminder_interval_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl GuardConfig {
    /// Never shorter than a second, even when built without validation
    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs.max(1))
    }

    pub fn refocus_debounce(&self) -> Duration {
        Duration::from_millis(self.refocus_debounce_ms)
    }

    pub fn reminder_cooldown(&self) -> Duration {
        Duration::from_secs(self.reminder_cooldown_secs)
    }
}
