//! # Entity Codec
//!
//! Entities are stored as JSON. Reads keep the raw bytes next to the decoded
//! value so a later write can make itself conditional on exactly what was
//! read.

use crate::errors::KVStoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode an entity for storage.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, KVStoreError> {
    serde_json::to_vec(value).map_err(|e| KVStoreError::SerializationError {
        message: e.to_string(),
    })
}

/// Decode a stored entity.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, KVStoreError> {
    serde_json::from_slice(bytes).map_err(|e| KVStoreError::CorruptionError {
        message: e.to_string(),
    })
}

/// A decoded entity together with the bytes it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub value: T,
    pub raw: Vec<u8>,
}

impl<T: DeserializeOwned> Stored<T> {
    pub fn decode(raw: Vec<u8>) -> Result<Self, KVStoreError> {
        let value = decode(&raw)?;
        Ok(Self { value, raw })
    }
}

impl<T> Stored<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        code: String,
        credits: f64,
    }

    #[test]
    fn test_stored_keeps_raw_bytes() {
        let row = Row {
            code: "CS101".into(),
            credits: 4.0,
        };
        let bytes = encode(&row).unwrap();
        let stored: Stored<Row> = Stored::decode(bytes.clone()).unwrap();
        assert_eq!(stored.raw, bytes);
        assert_eq!(stored.into_inner(), row);
    }

    #[test]
    fn test_decode_garbage_is_corruption() {
        let result: Result<Row, _> = decode(b"\x00\x01not json");
        assert!(matches!(result, Err(KVStoreError::CorruptionError { .. })));
    }
}
