//! Receiver errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("command `{program}` failed: {reason}")]
    Command { program: String, reason: String },

    #[error("protocol error: {0}")]
    Protocol(#[from] padlink_protocol::ProtocolError),

    #[error("input error: {0}")]
    Input(#[from] padlink_input::InputError),

    #[error("certificate error: {0}")]
    Certgen(#[from] padlink_certgen::CertgenError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
