//! Client configuration loaded from TOML.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use padlink_gesture::{GestureConfig, ThrottleConfig};
use padlink_types::Dimensions;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ClientError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

/// Where the receiver is and how to trust it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    /// Name announced to the receiver.
    #[serde(default = "default_name")]
    pub name: String,
    /// TLS server name to present. Must be one of the certificate's names.
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// `SHA256:..` fingerprint of the receiver certificate. Without it any
    /// certificate is accepted.
    #[serde(default)]
    pub fingerprint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            name: default_name(),
            server_name: default_server_name(),
            fingerprint: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ClientError> {
        self.address
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid server address {:?}: {e}", self.address)))
    }
}

/// Size of the touch surface, sent in the handshake.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl ViewportConfig {
    pub fn dimensions(self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

impl ClientConfig {
    /// Load from `path`, or from the default location if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ClientError> {
        let config_path = path.map_or_else(default_config_path, Path::to_path_buf);
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ClientError::Config(format!("failed to read config: {e}")))?;
            let config: Self = toml::from_str(&content)
                .map_err(|e| ClientError::Config(format!("failed to parse config: {e}")))?;
            info!(path = %config_path.display(), "loaded client config");
            config
        } else if path.is_some() {
            return Err(ClientError::Config(format!(
                "config file {} does not exist",
                config_path.display()
            )));
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        self.gesture.validate()?;
        if self.throttle.interval_ms == 0 {
            return Err(ClientError::Config(
                "throttle.interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("padlink")
        .join("client.toml")
}

fn default_address() -> String {
    "127.0.0.1:5173".to_string()
}

fn default_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "padlink-client".to_string())
}

fn default_server_name() -> String {
    "localhost".to_string()
}

fn default_width() -> u32 {
    390
}

fn default_height() -> u32 {
    844
}
