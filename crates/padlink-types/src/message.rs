//! Protocol message types.
//!
//! Messages are exchanged over a single ordered QUIC stream between the
//! phone-side client and the desktop receiver.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::client::ClientId;
use crate::intent::Intent;
use crate::screen::{Dimensions, ScreenSize};

/// Current protocol version.
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion { major: 0, minor: 1 };

/// Protocol version for compatibility negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ProtocolVersion {
    pub major: u16,
    pub minor: u16,
}

impl ProtocolVersion {
    /// Peers are compatible when their major versions agree.
    #[must_use]
    pub fn is_compatible_with(self, other: ProtocolVersion) -> bool {
        self.major == other.major
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Top-level message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub enum Message {
    /// First message from the client.
    Hello {
        version: ProtocolVersion,
        client_id: ClientId,
        name: String,
        viewport: Dimensions,
    },

    /// Receiver's answer to Hello.
    Welcome {
        version: ProtocolVersion,
        name: String,
        screen: ScreenSize,
    },

    /// A classified intent, in emission order.
    Intent(Intent),

    /// Keepalive ping.
    Ping { seq: u64 },

    /// Keepalive pong.
    Pong { seq: u64 },

    /// Graceful disconnect.
    Bye,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::ClickButton;

    fn bincode_roundtrip<T: Encode + Decode<()> + std::fmt::Debug>(value: &T) -> T {
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(value, config).unwrap();
        let (decoded, _): (T, _) = bincode::decode_from_slice(&bytes, config).unwrap();
        decoded
    }

    #[test]
    fn hello_keeps_viewport() {
        let msg = Message::Hello {
            version: PROTOCOL_VERSION,
            client_id: ClientId::new(),
            name: "phone".to_string(),
            viewport: Dimensions {
                width: 390,
                height: 844,
            },
        };
        match bincode_roundtrip(&msg) {
            Message::Hello { name, viewport, .. } => {
                assert_eq!(name, "phone");
                assert_eq!(viewport.width, 390);
                assert_eq!(viewport.height, 844);
            }
            other => panic!("expected Hello, got {other:?}"),
        }
    }

    #[test]
    fn intent_envelope() {
        let msg = Message::Intent(Intent::Click(ClickButton::Left));
        match bincode_roundtrip(&msg) {
            Message::Intent(intent) => assert_eq!(intent, Intent::Click(ClickButton::Left)),
            other => panic!("expected Intent, got {other:?}"),
        }
    }

    #[test]
    fn version_compatibility_ignores_minor() {
        let newer = ProtocolVersion { major: 0, minor: 7 };
        assert!(PROTOCOL_VERSION.is_compatible_with(newer));
        assert!(!PROTOCOL_VERSION.is_compatible_with(ProtocolVersion { major: 1, minor: 1 }));
    }

    #[test]
    fn protocol_version_display() {
        assert_eq!(PROTOCOL_VERSION.to_string(), "0.1");
    }
}
