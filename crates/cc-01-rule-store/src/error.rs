//! Error types for the Rule Store

use shared_store::KVStoreError;
use shared_types::{ErrorCategory, RegulationId, Timestamp, ValidationError};
use thiserror::Error;
use uuid::Uuid;

/// Rule Store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleStoreError {
    /// Regulation does not exist
    #[error("Regulation not found: {id}")]
    RegulationNotFound { id: RegulationId },

    /// No regulation carries this code
    #[error("Regulation not found for code {code}")]
    RegulationCodeNotFound { code: String },

    /// Regulation is locked; its rules can only change through the override ledger
    #[error("Regulation {id} is locked (locked at {locked_at:?})")]
    RegulationLocked {
        id: RegulationId,
        locked_at: Option<Timestamp>,
    },

    /// Edit was based on a stale version
    #[error("Version conflict on regulation {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: RegulationId,
        expected: u64,
        actual: u64,
    },

    /// Regulation code already taken
    #[error("Regulation code already exists: {code}")]
    DuplicateCode { code: String },

    /// Child row collides with an existing one
    #[error("Duplicate {kind}: {key}")]
    DuplicateRow { kind: &'static str, key: String },

    /// Child row does not exist under this regulation
    #[error("{kind} not found: {id}")]
    RowNotFound { kind: &'static str, id: Uuid },

    /// Payload failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

impl RuleStoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RuleStoreError::RegulationNotFound { .. }
            | RuleStoreError::RegulationCodeNotFound { .. }
            | RuleStoreError::RowNotFound { .. } => ErrorCategory::NotFound,
            RuleStoreError::RegulationLocked { .. }
            | RuleStoreError::VersionConflict { .. }
            | RuleStoreError::DuplicateCode { .. }
            | RuleStoreError::DuplicateRow { .. } => ErrorCategory::Conflict,
            RuleStoreError::Validation(_) => ErrorCategory::Validation,
            RuleStoreError::Storage(_) => ErrorCategory::Internal,
        }
    }
}

/// Result type for rule store operations
pub type RuleStoreResult<T> = Result<T, RuleStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_is_conflict() {
        let err = RuleStoreError::RegulationLocked {
            id: RegulationId::new(),
            locked_at: Some(10),
        };
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_validation_passes_message_through() {
        let err: RuleStoreError = ValidationError::new("code", "must not be empty").into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.to_string(), "invalid code: must not be empty");
    }
}
