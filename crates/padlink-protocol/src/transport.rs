//! QUIC endpoints for the receiver and the client.

use std::net::{Ipv4Addr, SocketAddr};

use quinn::Endpoint;
use tracing::{debug, info};

use crate::connection::PeerConnection;
use crate::error::ProtocolError;
use crate::tls;

/// A QUIC endpoint. The receiver binds one with a certificate and accepts;
/// the client creates an outbound-only one and connects.
#[derive(Clone)]
pub struct QuicTransport {
    endpoint: Endpoint,
}

fn install_crypto_provider() {
    // Fails harmlessly when a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();
}

impl QuicTransport {
    /// Bind a receiver endpoint on `addr`.
    pub fn bind(addr: SocketAddr, cert_pem: &str, key_pem: &str) -> Result<Self, ProtocolError> {
        install_crypto_provider();
        let server_config = tls::server_config(cert_pem, key_pem)?;
        let endpoint = Endpoint::server(server_config, addr)
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        info!(addr = %addr, "QUIC endpoint listening");
        Ok(Self { endpoint })
    }

    /// Create a client endpoint on an ephemeral port.
    pub fn client(fingerprint: Option<&str>) -> Result<Self, ProtocolError> {
        install_crypto_provider();
        let client_config = tls::client_config(fingerprint)?;
        let mut endpoint = Endpoint::client(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        endpoint.set_default_client_config(client_config);
        Ok(Self { endpoint })
    }

    /// Wait for the next incoming connection.
    pub async fn accept(&self) -> Result<PeerConnection, ProtocolError> {
        let incoming = self
            .endpoint
            .accept()
            .await
            .ok_or_else(|| ProtocolError::Connection("endpoint closed".to_string()))?;
        let connection = incoming
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        debug!(remote = %connection.remote_address(), "accepted connection");
        Ok(PeerConnection::new(connection))
    }

    pub async fn connect(
        &self,
        addr: SocketAddr,
        server_name: &str,
    ) -> Result<PeerConnection, ProtocolError> {
        let connection = self
            .endpoint
            .connect(addr, server_name)
            .map_err(|e| ProtocolError::Connection(e.to_string()))?
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        debug!(remote = %addr, "connected to receiver");
        Ok(PeerConnection::new(connection))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ProtocolError> {
        self.endpoint
            .local_addr()
            .map_err(|e| ProtocolError::Connection(e.to_string()))
    }

    pub fn close(&self) {
        self.endpoint.close(quinn::VarInt::from_u32(0), b"shutdown");
        debug!("QUIC endpoint closed");
    }

    /// Wait until every connection on this endpoint has closed.
    pub async fn wait_idle(&self) {
        self.endpoint.wait_idle().await;
    }
}
