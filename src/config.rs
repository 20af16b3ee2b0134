//! Startup configuration.
//!
//! Values come from the command line, optionally layered over a TOML file when
//! the `config` feature is enabled. Command-line values always win.

use crate::error::{LineServeError, Result};
use crate::index::validate_file_path;
use std::path::PathBuf;

/// Default anchor budget for the offset cache
pub const DEFAULT_CAPACITY: usize = 1024 * 1024;

/// Default listen address
pub const DEFAULT_SERVER_ADDR: &str = "localhost:8080";

/// Optional settings from one configuration source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(deny_unknown_fields))]
pub struct ConfigOverrides {
    pub cache_size: Option<usize>,
    pub server_addr: Option<String>,
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    /// Fill unset values from a lower-priority source
    pub fn or(self, fallback: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            cache_size: self.cache_size.or(fallback.cache_size),
            server_addr: self.server_addr.or(fallback.server_addr),
            seed: self.seed.or(fallback.seed),
        }
    }
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// File to serve
    pub file: PathBuf,
    /// Anchor budget; 0 behaves like 1
    pub capacity: usize,
    /// `host:port` to listen on
    pub server_addr: String,
    /// Seed for extra anchor selection
    pub seed: Option<u64>,
}

impl ServerConfig {
    /// Resolve a configuration, applying defaults for anything unset
    pub fn new(file: impl Into<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self {
            file: file.into(),
            capacity: overrides.cache_size.unwrap_or(DEFAULT_CAPACITY),
            server_addr: overrides
                .server_addr
                .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            seed: overrides.seed,
        }
    }

    /// Check the configuration before any work starts
    ///
    /// # Errors
    /// * `ConfigError` if the target file is unusable or the address is malformed
    pub fn validate(&self) -> Result<()> {
        validate_file_path(&self.file)?;

        match self.server_addr.rsplit_once(':') {
            Some((_, port)) if port.parse::<u16>().is_ok() => Ok(()),
            _ => Err(LineServeError::config(format!(
                "Invalid server address '{}': expected host:port",
                self.server_addr
            ))),
        }
    }
}

#[cfg(feature = "config")]
mod file {
    use super::ConfigOverrides;
    use crate::error::{LineServeError, Result};
    use std::path::{Path, PathBuf};

    impl ConfigOverrides {
        /// Load settings from a TOML file
        pub fn from_file(path: &Path) -> Result<Self> {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                LineServeError::config(format!("Cannot read config file {}: {}", path.display(), e))
            })?;
            toml::from_str(&contents).map_err(|e| {
                LineServeError::config(format!("Invalid config file {}: {}", path.display(), e))
            })
        }

        /// `<config dir>/lineserve/config.toml` for the current user
        pub fn default_path() -> Option<PathBuf> {
            dirs::config_dir().map(|dir| dir.join("lineserve").join("config.toml"))
        }

        /// Load the explicit config file, or the default one when it exists
        pub fn discover(explicit: Option<&Path>) -> Result<Self> {
            if let Some(path) = explicit {
                return Self::from_file(path);
            }
            match Self::default_path() {
                Some(path) if path.is_file() => {
                    log::info!("Using config file {}", path.display());
                    Self::from_file(&path)
                }
                _ => Ok(Self::default()),
            }
        }
    }
}
