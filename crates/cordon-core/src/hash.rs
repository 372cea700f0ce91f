//! Content hashing for audit chain linking.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A blake3 content hash.
///
/// Audit events are chain-linked per session: each event carries the hash
/// of the previous one, so any mutation of history is detectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(#[serde(with = "hex_bytes")] [u8; 32]);

impl ContentHash {
    /// Hash arbitrary bytes.
    #[must_use]
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// The zero hash, used as the chain root.
    #[must_use]
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Raw hash bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a hash from its lowercase hex rendering.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHash`] if the input is not 64 hex chars.
    pub fn from_hex(s: &str) -> CoreResult<Self> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidHash(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidHash("expected 32 bytes".to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8; 32], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&hex::encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(de)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let a = ContentHash::hash(b"hello");
        let b = ContentHash::hash(b"hello");
        assert_eq!(a, b);
        assert_ne!(a, ContentHash::hash(b"world"));
    }

    #[test]
    fn test_zero_hash() {
        let zero = ContentHash::zero();
        assert_eq!(zero.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_hex_roundtrip() {
        let hash = ContentHash::hash(b"chain link");
        let hex_str = hash.to_string();
        assert_eq!(hex_str.len(), 64);
        let parsed = ContentHash::from_hex(&hex_str).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(ContentHash::from_hex("not hex").is_err());
        assert!(ContentHash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let hash = ContentHash::hash(b"event");
        let json = serde_json::to_string(&hash).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
