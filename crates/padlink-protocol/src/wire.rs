//! Wire format: length-prefixed bincode v2 frames.
//!
//! Each frame is `[u32 big-endian length][bincode v2 payload]`.

use bincode::{Decode, Encode};

use crate::error::ProtocolError;

/// Largest payload accepted in either direction (64 KiB). Intents are a
/// few dozen bytes; anything near this is a broken or hostile peer.
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

/// Length of the frame header.
pub const HEADER_LEN: usize = 4;

/// Encode a message into a complete frame, header included.
pub fn encode_frame<T: Encode>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload = bincode::encode_to_vec(msg, bincode::config::standard())
        .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
    let len = checked_len(payload.len())?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Validate a frame header and return the payload length it announces.
pub fn payload_len(header: [u8; HEADER_LEN]) -> Result<usize, ProtocolError> {
    let len = u32::from_be_bytes(header);
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: len as usize,
            max: MAX_FRAME_SIZE,
        });
    }
    Ok(len as usize)
}

/// Decode a payload (header already stripped).
pub fn decode_payload<T: Decode<()>>(payload: &[u8]) -> Result<T, ProtocolError> {
    let (msg, consumed) = bincode::decode_from_slice(payload, bincode::config::standard())
        .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
    if consumed != payload.len() {
        return Err(ProtocolError::Deserialization(format!(
            "{} trailing bytes after message",
            payload.len() - consumed
        )));
    }
    Ok(msg)
}

fn checked_len(len: usize) -> Result<u32, ProtocolError> {
    match u32::try_from(len) {
        Ok(n) if n <= MAX_FRAME_SIZE => Ok(n),
        _ => Err(ProtocolError::FrameTooLarge {
            size: len,
            max: MAX_FRAME_SIZE,
        }),
    }
}
