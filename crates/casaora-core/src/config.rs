//! Configuration resolution for the agent bridge.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Settings file (JSON, path given by the caller)
//! 3. Environment variables (`CASAORA_*`)
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{Error, Result};

/// Complete bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Agent backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the agent API, including its version prefix.
    pub api_base_url: String,
    /// TCP connect timeout for the agent API (seconds).
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/v1".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

/// Output stream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Namespace used in `data-<namespace>-*` frame types.
    pub data_namespace: String,
    /// Cookie holding the session access token when no bearer header is sent.
    pub session_cookie: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            data_namespace: "casaora".to_string(),
            session_cookie: "casaora-access-token".to_string(),
        }
    }
}

/// Load configuration with hierarchical resolution.
///
/// A missing settings file is not an error; an unreadable or malformed one is.
pub fn load_config(settings_path: Option<&Path>) -> Result<Config> {
    let mut config = match settings_path {
        Some(path) if path.exists() => load_config_file(path)?,
        _ => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("CASAORA_LISTEN_ADDR") {
        if let Ok(addr) = val.parse() {
            config.server.listen_addr = addr;
        }
    }
    if let Some(val) = var("CASAORA_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(val) = var("CASAORA_API_BASE_URL") {
        config.upstream.api_base_url = val;
    }
    if let Some(val) = var("CASAORA_CONNECT_TIMEOUT_SECS") {
        if let Ok(n) = val.parse() {
            config.upstream.connect_timeout_secs = n;
        }
    }
    if let Some(val) = var("CASAORA_DATA_NAMESPACE") {
        config.stream.data_namespace = val;
    }
    if let Some(val) = var("CASAORA_SESSION_COOKIE") {
        config.stream.session_cookie = val;
    }
}

/// Reject settings the bridge cannot run with.
pub fn validate(config: &Config) -> Result<()> {
    if config.upstream.api_base_url.trim().is_empty() {
        return Err(Error::Config("upstream.api_base_url is empty".into()));
    }
    let namespace = &config.stream.data_namespace;
    if namespace.is_empty()
        || !namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::Config(format!(
            "stream.data_namespace must be a non-empty identifier, got {namespace:?}"
        )));
    }
    Ok(())
}
