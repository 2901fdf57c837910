//! Backend connection settings
//!
//! Read from the environment in deployed builds and from TOML in tests and
//! tools:
//!
//! ```toml
//! base_url = "https://inventario.example.com"
//! timeout_secs = 15
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::RestError;

pub const API_URL_ENV: &str = "INVENTORY_API_URL";
pub const API_TIMEOUT_ENV: &str = "INVENTORY_API_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Scheme, host and optional path prefix; `/api/...` is appended
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads `INVENTORY_API_URL` and `INVENTORY_API_TIMEOUT_SECS`; unset or
    /// blank variables keep their defaults
    pub fn from_env() -> Result<Self, RestError> {
        let mut config = Self::default();

        if let Some(url) = non_blank_var(API_URL_ENV) {
            config.base_url = url;
        }
        if let Some(timeout) = non_blank_var(API_TIMEOUT_ENV) {
            config.timeout_secs = timeout.parse().map_err(|_| {
                RestError::Config(format!("{API_TIMEOUT_ENV} must be a number of seconds, got '{timeout}'"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RestError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), RestError> {
        if self.base_url.trim().is_empty() {
            return Err(RestError::Config("base_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(RestError::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
