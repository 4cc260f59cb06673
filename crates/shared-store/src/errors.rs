//! # Store Errors

use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },

    /// A conditional batch found a key in an unexpected state.
    ///
    /// Nothing from the batch was applied.
    #[error("precondition failed on key {key}")]
    PreconditionFailed { key: String },

    /// Entity could not be encoded or decoded.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// The backing file is held by another process.
    #[error("store locked: {message}")]
    Locked { message: String },
}

impl KVStoreError {
    pub fn is_precondition_failure(&self) -> bool {
        matches!(self, KVStoreError::PreconditionFailed { .. })
    }
}
