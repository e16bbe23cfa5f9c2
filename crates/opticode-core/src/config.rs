//! Client configuration.
//!
//! Loaded from `config.toml`; every field has a default so a missing or
//! partial file configures a working client.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_history_limit() -> usize {
    100
}

/// Remote gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory for the durable store. `None` resolves to the
    /// platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Maximum number of entries kept in the history feed.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            history_limit: default_history_limit(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigRoot {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ConfigRoot {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
