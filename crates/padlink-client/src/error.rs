//! Client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid gesture settings: {0}")]
    Gesture(#[from] padlink_gesture::GestureConfigError),

    #[error("invalid touch trace: {0}")]
    Trace(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] padlink_protocol::ProtocolError),

    #[error("session is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
