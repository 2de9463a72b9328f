//! Transport between the padlink client and receiver.
//!
//! QUIC (via quinn) carries length-prefixed bincode v2 frames on a single
//! ordered bidirectional stream per session. Connections open with a
//! `Hello`/`Welcome` exchange, then carry intents until either side says
//! `Bye` or the connection drops.

pub mod connection;
pub mod error;
pub mod handshake;
pub mod tls;
pub mod transport;
pub mod wire;

pub use connection::{MessageReceiver, MessageSender, PeerConnection};
pub use error::ProtocolError;
pub use handshake::{ClientHello, ServerWelcome, Session};
pub use transport::QuicTransport;
