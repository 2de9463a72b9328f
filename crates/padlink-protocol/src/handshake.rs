//! Session handshake.
//!
//! The client opens the session stream and sends `Hello`; the receiver
//! checks the version and answers `Welcome`. Either side gives up after
//! [`HANDSHAKE_TIMEOUT`].

use std::time::Duration;

use padlink_types::{ClientId, Dimensions, Message, ProtocolVersion, ScreenSize, PROTOCOL_VERSION};
use tracing::debug;

use crate::connection::{MessageReceiver, MessageSender, PeerConnection};
use crate::error::ProtocolError;

pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// What the client says about itself.
#[derive(Debug, Clone)]
pub struct ClientHello {
    pub client_id: ClientId,
    pub name: String,
    pub viewport: Dimensions,
}

/// What the receiver says about itself.
#[derive(Debug, Clone)]
pub struct ServerWelcome {
    pub name: String,
    pub screen: ScreenSize,
}

/// An established session stream.
pub struct Session<P> {
    pub sender: MessageSender,
    pub receiver: MessageReceiver,
    /// The other side's handshake message.
    pub peer: P,
}

fn check_version(remote: ProtocolVersion) -> Result<(), ProtocolError> {
    if PROTOCOL_VERSION.is_compatible_with(remote) {
        Ok(())
    } else {
        Err(ProtocolError::VersionMismatch {
            remote: remote.to_string(),
            local: PROTOCOL_VERSION.to_string(),
        })
    }
}

async fn first_message(receiver: &mut MessageReceiver) -> Result<Message, ProtocolError> {
    tokio::time::timeout(HANDSHAKE_TIMEOUT, receiver.recv::<Message>())
        .await
        .map_err(|_| ProtocolError::Handshake("timed out".to_string()))??
        .ok_or_else(|| ProtocolError::Handshake("stream closed before handshake".to_string()))
}

/// Client side: open the stream, send `Hello`, wait for `Welcome`.
pub async fn initiate(
    conn: &PeerConnection,
    hello: ClientHello,
) -> Result<Session<ServerWelcome>, ProtocolError> {
    let (mut sender, mut receiver) = conn.open_stream().await?;
    sender
        .send(&Message::Hello {
            version: PROTOCOL_VERSION,
            client_id: hello.client_id,
            name: hello.name,
            viewport: hello.viewport,
        })
        .await?;

    match first_message(&mut receiver).await? {
        Message::Welcome {
            version,
            name,
            screen,
        } => {
            check_version(version)?;
            debug!(server = %name, width = screen.width, height = screen.height, "handshake complete");
            Ok(Session {
                sender,
                receiver,
                peer: ServerWelcome { name, screen },
            })
        }
        other => Err(ProtocolError::Handshake(format!(
            "expected Welcome, got {other:?}"
        ))),
    }
}

/// Receiver side: accept the stream, read `Hello`, answer `Welcome`.
///
/// A client with an incompatible major version is told so with `Bye`
/// before the error is returned.
pub async fn respond(
    conn: &PeerConnection,
    welcome: ServerWelcome,
) -> Result<Session<ClientHello>, ProtocolError> {
    let (mut sender, mut receiver) = tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.accept_stream())
        .await
        .map_err(|_| ProtocolError::Handshake("no stream opened".to_string()))??;

    match first_message(&mut receiver).await? {
        Message::Hello {
            version,
            client_id,
            name,
            viewport,
        } => {
            if let Err(e) = check_version(version) {
                let _ = sender.send(&Message::Bye).await;
                return Err(e);
            }
            sender
                .send(&Message::Welcome {
                    version: PROTOCOL_VERSION,
                    name: welcome.name,
                    screen: welcome.screen,
                })
                .await?;
            debug!(client = %name, %client_id, "handshake complete");
            Ok(Session {
                sender,
                receiver,
                peer: ClientHello {
                    client_id,
                    name,
                    viewport,
                },
            })
        }
        other => Err(ProtocolError::Handshake(format!(
            "expected Hello, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_major_is_accepted() {
        assert!(check_version(ProtocolVersion {
            major: PROTOCOL_VERSION.major,
            minor: PROTOCOL_VERSION.minor + 3,
        })
        .is_ok());
    }

    #[test]
    fn other_major_is_rejected() {
        let err = check_version(ProtocolVersion {
            major: PROTOCOL_VERSION.major + 1,
            minor: 0,
        })
        .unwrap_err();
        assert!(matches!(err, ProtocolError::VersionMismatch { .. }));
    }
}
