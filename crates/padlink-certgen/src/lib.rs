//! Self-signed certificates for the padlink receiver.
//!
//! The receiver presents a self-signed certificate on its QUIC endpoint.
//! Phones reach it by LAN address, so the certificate carries the receiver's
//! IP addresses as subject alternative names next to its hostname. Clients
//! may pin the SHA-256 fingerprint instead of trusting a CA.

pub mod error;

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

pub use error::CertgenError;

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, SanType};
use tracing::info;

/// File name of the PEM certificate inside a certificate directory.
pub const CERT_FILE: &str = "cert.pem";
/// File name of the PEM private key inside a certificate directory.
pub const KEY_FILE: &str = "key.pem";

/// A generated certificate and private key pair.
pub struct GeneratedCert {
    pub cert_pem: String,
    pub key_pem: String,
    /// `SHA256:aa:bb:...` over the DER certificate.
    pub fingerprint: String,
}

impl GeneratedCert {
    /// Write `cert.pem` and `key.pem` into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf), CertgenError> {
        std::fs::create_dir_all(dir)?;
        let cert_path = dir.join(CERT_FILE);
        let key_path = dir.join(KEY_FILE);
        std::fs::write(&cert_path, &self.cert_pem)?;
        std::fs::write(&key_path, &self.key_pem)?;
        restrict_permissions(&key_path)?;
        info!(path = %dir.display(), fingerprint = %self.fingerprint, "wrote certificate pair");
        Ok((cert_path, key_path))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Generate a certificate for `hostname`, also valid for `localhost`,
/// `127.0.0.1`, and every address in `addresses`.
pub fn generate_certificate(
    hostname: &str,
    addresses: &[IpAddr],
) -> Result<GeneratedCert, CertgenError> {
    let key_pair = KeyPair::generate().map_err(|e| CertgenError::Generation(e.to_string()))?;

    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, hostname);
    dn.push(DnType::OrganizationName, "padlink");
    params.distinguished_name = dn;

    let mut names = vec![dns_name(hostname)?];
    if hostname != "localhost" {
        names.push(dns_name("localhost")?);
    }
    let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);
    names.push(SanType::IpAddress(loopback));
    names.extend(
        addresses
            .iter()
            .filter(|ip| **ip != loopback)
            .map(|ip| SanType::IpAddress(*ip)),
    );
    params.subject_alt_names = names;

    let cert = params
        .self_signed(&key_pair)
        .map_err(|e| CertgenError::Generation(e.to_string()))?;

    Ok(GeneratedCert {
        cert_pem: cert.pem(),
        key_pem: key_pair.serialize_pem(),
        fingerprint: certificate_fingerprint(cert.der()),
    })
}

fn dns_name(name: &str) -> Result<SanType, CertgenError> {
    let ia5 = name.try_into().map_err(|e: rcgen::Error| CertgenError::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(SanType::DnsName(ia5))
}

/// SHA-256 fingerprint of DER certificate bytes, as `SHA256:` followed by
/// colon-separated lowercase hex.
pub fn certificate_fingerprint(der: &[u8]) -> String {
    use std::fmt::Write;
    let digest = ring::digest::digest(&ring::digest::SHA256, der);
    let mut fingerprint = String::from("SHA256:");
    for (i, byte) in digest.as_ref().iter().enumerate() {
        if i > 0 {
            fingerprint.push(':');
        }
        let _ = write!(fingerprint, "{byte:02x}");
    }
    fingerprint
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_pem_pair() {
        let cert = generate_certificate("desk", &[]).unwrap();
        assert!(cert.cert_pem.contains("BEGIN CERTIFICATE"));
        assert!(cert.key_pem.contains("BEGIN PRIVATE KEY"));
        assert!(cert.fingerprint.starts_with("SHA256:"));
        // 32 bytes, two hex digits each, 31 separators.
        assert_eq!(cert.fingerprint.len(), "SHA256:".len() + 32 * 2 + 31);
    }

    #[test]
    fn accepts_lan_addresses() {
        let lan: IpAddr = "192.168.1.20".parse().unwrap();
        let cert = generate_certificate("desk", &[lan, IpAddr::V4(Ipv4Addr::LOCALHOST)]).unwrap();
        assert!(cert.cert_pem.contains("BEGIN CERTIFICATE"));
    }

    #[test]
    fn rejects_unrepresentable_hostname() {
        let err = generate_certificate("bad\u{e9}name", &[]).err().unwrap();
        assert!(matches!(err, CertgenError::InvalidName { .. }));
    }

    #[test]
    fn fingerprint_is_stable() {
        let a = certificate_fingerprint(b"padlink");
        assert_eq!(a, certificate_fingerprint(b"padlink"));
        assert_ne!(a, certificate_fingerprint(b"padlink!"));
    }

    #[test]
    fn write_to_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let cert = generate_certificate("desk", &[]).unwrap();
        let (cert_path, key_path) = cert.write_to(&dir.path().join("tls")).unwrap();
        assert_eq!(std::fs::read_to_string(cert_path).unwrap(), cert.cert_pem);
        assert_eq!(std::fs::read_to_string(key_path).unwrap(), cert.key_pem);
    }
}
