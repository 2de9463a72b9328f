//! Client identity types.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one phone-side client session.
///
/// A fresh ID is drawn per session so the receiver can tell a reconnect
/// from a second phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct ClientId(#[bincode(with_serde)] Uuid);

impl ClientId {
    /// Generate a new random client ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a client ID from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_unique() {
        assert_ne!(ClientId::new(), ClientId::new());
    }

    #[test]
    fn client_id_display_is_hyphenated_uuid() {
        let s = ClientId::new().to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s.matches('-').count(), 4);
    }

    #[test]
    fn client_id_survives_bincode() {
        let id = ClientId::new();
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(id, config).unwrap();
        let (decoded, _): (ClientId, _) = bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(id, decoded);
    }
}
