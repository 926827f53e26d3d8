//! Configuration management for finadvisord.
//!
//! Loads settings from /etc/finadvisor/config.toml or uses defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/finadvisor/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/finadvisor/config.toml";

/// Listener and request handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, an IP literal (all interfaces by default)
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Per-request timeout for HTTP routes in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "finadvisord=debug,tower_http=info"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(String),
    /// No readable config file; carries the last load error
    Defaults(String),
}

impl Config {
    /// Load config from the first readable path, or return defaults.
    ///
    /// Logging is not initialised yet when this runs, so the origin is
    /// returned for the caller to report.
    pub fn load() -> (Self, ConfigOrigin) {
        Self::load_first(&[CONFIG_PATH, DEFAULT_CONFIG_PATH])
    }

    /// Try each path in order
    pub fn load_first(paths: &[&str]) -> (Self, ConfigOrigin) {
        let mut last_error = String::from("no config paths given");
        for path in paths {
            match Self::load_from_path(path) {
                Ok(config) => return (config, ConfigOrigin::File(path.to_string())),
                Err(e) => last_error = format!("{:#}", e),
            }
        }
        (Config::default(), ConfigOrigin::Defaults(last_error))
    }

    /// Load config from specific path
    pub fn load_from_path(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path))?;
        Ok(config)
    }

    /// Resolve the configured bind address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid bind host '{}'", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
