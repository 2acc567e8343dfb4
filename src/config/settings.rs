//! Application settings configuration
//!
//! Defines WHOIS and TLS settings, loaded from TOML with every field
//! optional.

use crate::checks::whois::{IANA_WHOIS_SERVER, WHOIS_PORT};
use crate::utils::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// WHOIS settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhoisSettings {
    /// Root authority queried for TLD delegation
    pub root_server: String,
    pub port: u16,
    pub timeout_secs: u64,
}

impl Default for WhoisSettings {
    fn default() -> Self {
        Self {
            root_server: IANA_WHOIS_SERVER.to_string(),
            port: WHOIS_PORT,
            timeout_secs: 10,
        }
    }
}

impl WhoisSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// TLS settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    pub connect_timeout_ms: u64,
    pub io_timeout_secs: u64,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 1000,
            io_timeout_secs: 5,
        }
    }
}

impl TlsSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub whois: WhoisSettings,
    pub tls: TlsSettings,
}

impl Settings {
    /// Default config file location, `<config dir>/spiry/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("spiry").join("config.toml"))
    }

    /// Load settings from the default config file, falling back to defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }
}
