//! TLS configuration for the QUIC endpoint.
//!
//! The receiver serves a self-signed certificate. Clients either pin its
//! SHA-256 fingerprint or, when none is configured, accept any certificate
//! (trust on first use). Handshake signatures are checked in both cases.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use tracing::{debug, warn};

use crate::error::ProtocolError;

/// ALPN identifier negotiated by both ends.
pub const ALPN: &[u8] = b"padlink/0.1";

/// Build a quinn `ServerConfig` from PEM-encoded cert and key.
pub fn server_config(cert_pem: &str, key_pem: &str) -> Result<quinn::ServerConfig, ProtocolError> {
    let certs = parse_certs(cert_pem)?;
    let key = parse_key(key_pem)?;

    let mut tls_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ProtocolError::Tls(e.to_string()))?;
    tls_config.alpn_protocols = vec![ALPN.to_vec()];

    let config = quinn::ServerConfig::with_crypto(Arc::new(
        quinn::crypto::rustls::QuicServerConfig::try_from(tls_config)
            .map_err(|e| ProtocolError::Tls(e.to_string()))?,
    ));
    debug!("built server TLS config");
    Ok(config)
}

/// Build a quinn `ClientConfig`, pinning `fingerprint` when given.
pub fn client_config(fingerprint: Option<&str>) -> Result<quinn::ClientConfig, ProtocolError> {
    if fingerprint.is_none() {
        warn!("no server fingerprint pinned, accepting any certificate");
    }
    let verifier = ReceiverVerifier {
        pinned: fingerprint.map(|f| f.trim().to_string()),
        algorithms: rustls::crypto::ring::default_provider().signature_verification_algorithms,
    };
    let mut tls_config = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    tls_config.alpn_protocols = vec![ALPN.to_vec()];

    let config = quinn::ClientConfig::new(Arc::new(
        quinn::crypto::rustls::QuicClientConfig::try_from(tls_config)
            .map_err(|e| ProtocolError::Tls(e.to_string()))?,
    ));
    Ok(config)
}

fn parse_certs(pem: &str) -> Result<Vec<CertificateDer<'static>>, ProtocolError> {
    let mut reader = std::io::BufReader::new(pem.as_bytes());
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ProtocolError::Tls(format!("failed to parse certificate PEM: {e}")))?;
    if certs.is_empty() {
        return Err(ProtocolError::Tls("no certificates found in PEM".to_string()));
    }
    Ok(certs)
}

fn parse_key(pem: &str) -> Result<PrivateKeyDer<'static>, ProtocolError> {
    let mut reader = std::io::BufReader::new(pem.as_bytes());
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| ProtocolError::Tls(format!("failed to parse key PEM: {e}")))?
        .ok_or_else(|| ProtocolError::Tls("no private key found in PEM".to_string()))
}

/// Fingerprint of the first certificate in a PEM bundle.
pub fn pem_fingerprint(cert_pem: &str) -> Result<String, ProtocolError> {
    let certs = parse_certs(cert_pem)?;
    Ok(padlink_certgen::certificate_fingerprint(certs[0].as_ref()))
}

#[derive(Debug)]
struct ReceiverVerifier {
    pinned: Option<String>,
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for ReceiverVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let Some(expected) = &self.pinned else {
            return Ok(ServerCertVerified::assertion());
        };
        let actual = padlink_certgen::certificate_fingerprint(end_entity.as_ref());
        // Hex digits may be pasted in either case.
        if actual.eq_ignore_ascii_case(expected) {
            Ok(ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::General(format!(
                "server certificate fingerprint {actual} does not match pinned {expected}"
            )))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pem_fingerprint_matches_generated() {
        let cert = padlink_certgen::generate_certificate("desk", &[]).unwrap();
        assert_eq!(pem_fingerprint(&cert.cert_pem).unwrap(), cert.fingerprint);
    }

    #[test]
    fn garbage_pem_rejected() {
        assert!(matches!(
            pem_fingerprint("not a certificate"),
            Err(ProtocolError::Tls(_))
        ));
        assert!(matches!(parse_key(""), Err(ProtocolError::Tls(_))));
    }

    fn verifier(pinned: Option<&str>) -> ReceiverVerifier {
        ReceiverVerifier {
            pinned: pinned.map(str::to_string),
            algorithms: rustls::crypto::ring::default_provider().signature_verification_algorithms,
        }
    }

    fn verify(verifier: &ReceiverVerifier, cert_pem: &str) -> Result<ServerCertVerified, rustls::Error> {
        let certs = parse_certs(cert_pem).unwrap();
        let name = ServerName::try_from("localhost").unwrap();
        verifier.verify_server_cert(&certs[0], &[], &name, &[], UnixTime::now())
    }

    #[test]
    fn pinned_fingerprint_accepts_its_own_certificate() {
        let cert = padlink_certgen::generate_certificate("desk", &[]).unwrap();
        assert!(verify(&verifier(Some(&cert.fingerprint)), &cert.cert_pem).is_ok());
        let lower = cert.fingerprint.to_ascii_lowercase();
        assert!(verify(&verifier(Some(&lower)), &cert.cert_pem).is_ok());
    }

    #[test]
    fn pinned_fingerprint_rejects_other_certificate() {
        let pinned = padlink_certgen::generate_certificate("desk", &[]).unwrap();
        let other = padlink_certgen::generate_certificate("desk", &[]).unwrap();
        assert!(verify(&verifier(Some(&pinned.fingerprint)), &other.cert_pem).is_err());
        assert!(verify(&verifier(None), &other.cert_pem).is_ok());
    }

    #[test]
    fn server_config_from_generated_pair() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let cert = padlink_certgen::generate_certificate("desk", &[]).unwrap();
        assert!(server_config(&cert.cert_pem, &cert.key_pem).is_ok());
    }
}
