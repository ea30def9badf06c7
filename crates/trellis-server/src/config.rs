//! Server configuration.
//!
//! Configuration is read from an optional TOML file, then overridden by
//! command-line arguments and environment variables in the daemon.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trellis_common::{StoreError, StoreResult};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Data directory for persistent storage.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Run in memory-only mode.
    #[serde(default)]
    pub memory_mode: bool,

    /// Maximum accepted request frame size in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7171
}

fn default_max_frame_bytes() -> usize {
    4 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: None,
            memory_mode: false,
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| StoreError::Engine(format!(
            "cannot read config file {}: {err}",
            path.display()
        )))?;
        toml::from_str(&contents)
            .map_err(|err| StoreError::Engine(format!("invalid config file: {err}")))
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> StoreResult<String> {
        toml::to_string_pretty(self)
            .map_err(|err| StoreError::Engine(format!("cannot render config: {err}")))
    }

    /// The address to listen on, `host:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
