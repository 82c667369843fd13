//! Service configuration
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values arrive together as
//! [`ConfigOverrides`] (clap merges the two); this module layers them over
//! the TOML file and the defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5800";

/// Default session lifetime in hours
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub session_ttl_hours: i64,
    /// Allow any origin (development front-ends on another port)
    pub cors_permissive: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_path: default_database_path(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            cors_permissive: false,
        }
    }
}

/// Values from the command line or environment; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub session_ttl_hours: Option<i64>,
    pub cors_permissive: Option<bool>,
}

/// On-disk TOML layout; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub session_ttl_hours: Option<i64>,
    pub cors_permissive: Option<bool>,
}

impl FileConfig {
    /// Parse a TOML document
    pub fn parse(toml_content: &str) -> Result<Self> {
        toml::from_str(toml_content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }
}

impl ServiceConfig {
    /// Resolve the configuration from overrides, an optional TOML file, and defaults
    ///
    /// An explicitly named config file must exist; the platform default
    /// location is used only if present.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => {
                info!("Loading config file: {}", path.display());
                FileConfig::load(path)?
            }
            None => match locate_config_file() {
                Some(path) => {
                    info!("Loading config file: {}", path.display());
                    FileConfig::load(&path)?
                }
                None => {
                    debug!("No config file found; using defaults");
                    FileConfig::default()
                }
            },
        };

        Self::merge(overrides, file)
    }

    /// Layer overrides over file values over defaults
    pub fn merge(overrides: ConfigOverrides, file: FileConfig) -> Result<Self> {
        let defaults = ServiceConfig::default();

        let config = ServiceConfig {
            bind_addr: overrides
                .bind_addr
                .or(file.bind_addr)
                .unwrap_or(defaults.bind_addr),
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or(defaults.database_path),
            session_ttl_hours: overrides
                .session_ttl_hours
                .or(file.session_ttl_hours)
                .unwrap_or(defaults.session_ttl_hours),
            cors_permissive: overrides
                .cors_permissive
                .or(file.cors_permissive)
                .unwrap_or(defaults.cors_permissive),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.session_ttl_hours <= 0 {
            return Err(Error::Config(format!(
                "session_ttl_hours must be positive, got {}",
                self.session_ttl_hours
            )));
        }
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(Error::Config(format!(
                "bind_addr is not a socket address: {}",
                self.bind_addr
            )));
        }
        Ok(())
    }
}

/// First existing config file among the platform locations
fn locate_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("coursehub").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/coursehub/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("coursehub"))
        .unwrap_or_else(|| PathBuf::from("./coursehub_data"))
        .join("coursehub.db")
}
