//! Client configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via MCWIRE_CONFIG or --config)
//! 3. Environment variables
//! 4. Command-line flags (applied by the caller)

use mcwire_client::{AuthConfig, ConnectionConfig};
use mcwire_protocol::{DEFAULT_PORT, MAX_FRAME_SIZE, PROTOCOL_VERSION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target server.
    pub server: ServerConfig,
    /// Connection tuning.
    pub connection: ConnectionSettings,
    /// Account service.
    pub auth: AuthConfig,
}

impl Config {
    /// Loads configuration from `path` (if given), then applies environment
    /// variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_yaml()?).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a variable lookup. Unparseable values are
    /// ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("MCWIRE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("MCWIRE_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(version) = var("MCWIRE_PROTOCOL").and_then(|v| v.parse().ok()) {
            self.server.protocol_version = version;
        }
        if let Some(username) = var("MCWIRE_USERNAME") {
            self.connection.username = username;
        }
        if let Some(endpoint) = var("MCWIRE_AUTH_ENDPOINT") {
            self.auth.endpoint = endpoint;
        }
    }

    /// Builds the client connection settings.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(&self.server.host, self.server.port)
            .with_protocol_version(self.server.protocol_version)
            .with_username(&self.connection.username)
            .with_connect_timeout(Duration::from_secs(self.connection.connect_timeout_secs))
            .with_read_timeout(Duration::from_secs(self.connection.read_timeout_secs))
            .with_read_buffer_size(self.connection.read_buffer_size)
            .with_max_frame_size(self.connection.max_frame_size)
    }
}

/// Target server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

/// Connection tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Name used by offline logins.
    pub username: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub read_buffer_size: usize,
    pub max_frame_size: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            username: "Player".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            read_buffer_size: 8 * 1024,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    Parse(PathBuf, #[source] serde_yaml::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),
}
