use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::BrokerError;

/// TOML configuration for the browser. All fields are optional; a missing
/// config file yields the defaults, while an explicitly passed path that
/// does not parse is a startup error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra directory appended to `PATH` before locating `tsh`.
    pub tsh_path: Option<PathBuf>,
    /// Path of the JSON node cache. Caching is disabled when unset.
    pub node_cache_file: Option<PathBuf>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hopsh").join("config.toml"))
    }

    /// Load from `path` when given, otherwise from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self, BrokerError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if !explicit => {
                debug!(path = %path.display(), error = %err, "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(BrokerError::InvalidConfig {
                    path,
                    message: err.to_string(),
                });
            }
        };

        toml::from_str(&raw).map_err(|err| BrokerError::InvalidConfig {
            path,
            message: err.to_string(),
        })
    }
}
