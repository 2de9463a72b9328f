//! Config loading and TLS material.

use std::path::{Path, PathBuf};

use padlink_certgen::{CERT_FILE, KEY_FILE};
use tracing::info;

use crate::config::Config;
use crate::error::ReceiverError;
use crate::health::lan_address;

/// Load configuration from the given path, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ReceiverError> {
    let config_path = path.map_or_else(default_config_path, Path::to_path_buf);

    let config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ReceiverError::Config(format!("failed to read config: {e}")))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ReceiverError::Config(format!("failed to parse config: {e}")))?;
        info!(path = %config_path.display(), "loaded config");
        config
    } else if path.is_some() {
        return Err(ReceiverError::Config(format!(
            "config file {} does not exist",
            config_path.display()
        )));
    } else {
        info!("no config file found, using defaults");
        Config::default()
    };
    config.pointer.validate()?;
    Ok(config)
}

/// Load the TLS certificate and key from `dir`, or generate a pair for this
/// host and its LAN address if either is missing.
pub fn load_or_generate_certs(dir: &Path) -> Result<(String, String), ReceiverError> {
    let cert_path = dir.join(CERT_FILE);
    let key_path = dir.join(KEY_FILE);

    if cert_path.exists() && key_path.exists() {
        let cert_pem = std::fs::read_to_string(&cert_path)
            .map_err(|e| ReceiverError::Config(format!("failed to read cert: {e}")))?;
        let key_pem = std::fs::read_to_string(&key_path)
            .map_err(|e| ReceiverError::Config(format!("failed to read key: {e}")))?;
        let fingerprint = padlink_protocol::tls::pem_fingerprint(&cert_pem)?;
        info!(path = %cert_path.display(), %fingerprint, "loaded existing TLS cert");
        return Ok((cert_pem, key_pem));
    }

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "padlink".to_string());
    let addresses: Vec<_> = lan_address().into_iter().collect();

    let cert = padlink_certgen::generate_certificate(&hostname, &addresses)
        .or_else(|_| padlink_certgen::generate_certificate("padlink", &addresses))?;
    cert.write_to(dir)?;
    info!(fingerprint = %cert.fingerprint, "generated new TLS cert");
    Ok((cert.cert_pem, cert.key_pem))
}

/// Get the default config directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("padlink")
}

fn default_config_path() -> PathBuf {
    config_dir().join("receiver.toml")
}
