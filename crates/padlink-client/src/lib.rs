//! Phone side of padlink.
//!
//! A [`ClientSession`] turns touch callbacks into intents with a
//! [`GestureEngine`](padlink_gesture::GestureEngine) and hands them to an
//! [`IntentSink`]: a QUIC connection to a receiver, or a channel in tests.
//! [`replay`] drives the same machinery from recorded touch traces.

pub mod config;
pub mod error;
pub mod replay;
pub mod session;
pub mod sink;

pub use config::ClientConfig;
pub use error::ClientError;
pub use session::{ClientEvent, ClientHandle, ClientSession};
pub use sink::{ChannelSink, IntentSink, QuicSink};
