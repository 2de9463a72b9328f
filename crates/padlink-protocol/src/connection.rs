//! QUIC connection and stream framing.

use std::net::SocketAddr;

use bincode::{Decode, Encode};
use quinn::{Connection, RecvStream, SendStream};
use tracing::trace;

use crate::error::ProtocolError;
use crate::wire::{self, HEADER_LEN};

/// Close code sent on a graceful shutdown.
const CLOSE_OK: u32 = 0;

/// A connection between a phone client and the receiver.
///
/// Everything travels on one bidirectional stream so intents arrive in the
/// order they were classified.
#[derive(Clone)]
pub struct PeerConnection {
    connection: Connection,
}

impl PeerConnection {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn remote_address(&self) -> SocketAddr {
        self.connection.remote_address()
    }

    /// Open the session stream (client side).
    pub async fn open_stream(&self) -> Result<(MessageSender, MessageReceiver), ProtocolError> {
        let (send, recv) = self
            .connection
            .open_bi()
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        Ok((MessageSender::new(send), MessageReceiver::new(recv)))
    }

    /// Accept the session stream (receiver side).
    pub async fn accept_stream(&self) -> Result<(MessageSender, MessageReceiver), ProtocolError> {
        let (send, recv) = self
            .connection
            .accept_bi()
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        Ok((MessageSender::new(send), MessageReceiver::new(recv)))
    }

    /// Resolves once the connection is gone, for whatever reason.
    pub async fn closed(&self) -> ProtocolError {
        ProtocolError::Quinn(self.connection.closed().await)
    }

    pub fn close(&self, reason: &str) {
        self.connection
            .close(quinn::VarInt::from_u32(CLOSE_OK), reason.as_bytes());
    }
}

/// Writes framed messages to a QUIC send stream.
pub struct MessageSender {
    stream: SendStream,
}

impl MessageSender {
    fn new(stream: SendStream) -> Self {
        Self { stream }
    }

    pub async fn send<T: Encode>(&mut self, msg: &T) -> Result<(), ProtocolError> {
        let frame = wire::encode_frame(msg)?;
        self.stream
            .write_all(&frame)
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        trace!(len = frame.len() - HEADER_LEN, "sent frame");
        Ok(())
    }

    /// Signal that no more frames follow.
    pub fn finish(mut self) -> Result<(), ProtocolError> {
        self.stream
            .finish()
            .map_err(|e| ProtocolError::Connection(e.to_string()))
    }
}

/// Reads framed messages from a QUIC receive stream.
pub struct MessageReceiver {
    stream: RecvStream,
}

impl MessageReceiver {
    fn new(stream: RecvStream) -> Self {
        Self { stream }
    }

    /// Receive the next message. `Ok(None)` means the peer finished the
    /// stream cleanly between frames.
    pub async fn recv<T: Decode<()>>(&mut self) -> Result<Option<T>, ProtocolError> {
        let mut header = [0u8; HEADER_LEN];
        match self.stream.read_exact(&mut header).await {
            Ok(()) => {}
            Err(quinn::ReadExactError::FinishedEarly(0)) => return Ok(None),
            Err(quinn::ReadExactError::FinishedEarly(_)) => return Err(ProtocolError::StreamClosed),
            Err(quinn::ReadExactError::ReadError(e)) => {
                return Err(ProtocolError::Connection(e.to_string()));
            }
        }

        let len = wire::payload_len(header)?;
        let mut payload = vec![0u8; len];
        match self.stream.read_exact(&mut payload).await {
            Ok(()) => {}
            Err(quinn::ReadExactError::FinishedEarly(_)) => {
                return Err(ProtocolError::StreamClosed);
            }
            Err(quinn::ReadExactError::ReadError(e)) => {
                return Err(ProtocolError::Connection(e.to_string()));
            }
        }

        let msg = wire::decode_payload(&payload)?;
        trace!(len, "received frame");
        Ok(Some(msg))
    }
}
