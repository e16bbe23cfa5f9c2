//! Unified path management for opticode client files.
//!
//! All configuration and durable store data resolve through this module so
//! every component agrees on the same locations.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/opticode/          # Config directory
//! └── config.toml              # Client configuration
//!
//! ~/.local/share/opticode/     # Data directory
//! └── store/                   # JsonFileStore keys (one file per key)
//! ```

use opticode_core::config::ConfigRoot;
use std::fs;
use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for the opticode client.
pub struct OpticodePaths;

impl OpticodePaths {
    /// Returns the opticode configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("opticode"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the opticode data directory.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("opticode"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the base directory of the durable key-value store.
    pub fn store_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("store"))
    }

    /// Loads the client configuration.
    ///
    /// A missing config file (or an undeterminable home directory) yields
    /// the defaults; a present-but-malformed file is surfaced as a
    /// serialization error so a typo is not silently ignored.
    pub fn load_config() -> opticode_core::Result<ConfigRoot> {
        let path = match Self::config_file() {
            Ok(path) => path,
            Err(_) => return Ok(ConfigRoot::default()),
        };

        if !path.exists() {
            return Ok(ConfigRoot::default());
        }

        let raw = fs::read_to_string(&path)?;
        ConfigRoot::from_toml_str(&raw)
    }
}
