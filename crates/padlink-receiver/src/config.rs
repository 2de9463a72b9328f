//! Receiver configuration loaded from TOML.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use padlink_types::ScreenSize;
use serde::{Deserialize, Serialize};

use crate::error::ReceiverError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
}

/// Listener settings. QUIC (UDP) and the health endpoint (TCP) share `port`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_true")]
    pub health: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            health: true,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ReceiverError> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|e| ReceiverError::Config(format!("invalid bind address {:?}: {e}", self.bind)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Name announced to phones in the handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
        }
    }
}

/// Pointer ballistics and the motion tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerConfig {
    /// Screen pixels per touch pixel for plain movement.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Screen pixels per touch pixel while the button is held.
    #[serde(default = "default_drag_sensitivity")]
    pub drag_sensitivity: f64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Used by backends that cannot query the screen.
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            drag_sensitivity: default_drag_sensitivity(),
            tick_ms: default_tick_ms(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

impl PointerConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn screen(&self) -> ScreenSize {
        ScreenSize::new(self.screen_width, self.screen_height)
    }

    pub fn validate(&self) -> Result<(), ReceiverError> {
        for (name, value) in [
            ("sensitivity", self.sensitivity),
            ("drag_sensitivity", self.drag_sensitivity),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReceiverError::Config(format!(
                    "pointer.{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ReceiverError::Config("pointer screen size must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn default_port() -> u16 {
    5173
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "padlink".to_string())
}

fn default_sensitivity() -> f64 {
    5.0
}

fn default_drag_sensitivity() -> f64 {
    3.0
}

fn default_tick_ms() -> u64 {
    8
}

fn default_screen_width() -> u32 {
    1920
}

fn default_screen_height() -> u32 {
    1080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("port = 5173"));
        assert!(toml_str.contains("sensitivity = 5.0"));
    }

    #[test]
    fn parse_example_config() {
        let toml_str = r#"
[server]
port = 6000
bind = "127.0.0.1"
health = false
log_level = "debug"

[identity]
name = "desk"

[pointer]
sensitivity = 4.0
tick_ms = 16
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 6000);
        assert!(!config.server.health);
        assert_eq!(config.identity.name, "desk");
        assert!((config.pointer.sensitivity - 4.0).abs() < f64::EPSILON);
        assert!((config.pointer.drag_sensitivity - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.pointer.tick(), Duration::from_millis(16));
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "127.0.0.1:6000".parse().unwrap()
        );
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 5173);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.pointer.screen(), ScreenSize::new(1920, 1080));
        config.pointer.validate().unwrap();
    }

    #[test]
    fn rejects_bad_values() {
        let server = ServerConfig {
            bind: "not-an-ip".to_string(),
            ..ServerConfig::default()
        };
        assert!(server.socket_addr().is_err());

        let pointer = PointerConfig {
            drag_sensitivity: 0.0,
            ..PointerConfig::default()
        };
        assert!(pointer.validate().is_err());
    }
}
