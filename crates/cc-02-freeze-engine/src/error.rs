//! Error types for the Freeze Engine

use cc_01_rule_store::RuleStoreError;
use shared_store::KVStoreError;
use shared_types::{BatchId, ErrorCategory, RegulationId, Timestamp, ValidationError};
use thiserror::Error;

/// Freeze Engine errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FreezeError {
    /// Batch does not exist
    #[error("Batch not found: {id}")]
    BatchNotFound { id: BatchId },

    /// No batch carries this code
    #[error("Batch not found for code {code}")]
    BatchCodeNotFound { code: String },

    /// Batch code already taken
    #[error("Batch code already exists: {code}")]
    DuplicateBatchCode { code: String },

    /// Regulation referenced by the batch does not exist
    #[error("Regulation not found: {id}")]
    RegulationNotFound { id: RegulationId },

    /// Batch has already been frozen; its stamps are left untouched
    #[error("Batch {id} already frozen at {frozen_at} (checksum {checksum})")]
    BatchAlreadyFrozen {
        id: BatchId,
        frozen_at: Timestamp,
        checksum: String,
    },

    /// Operation needs a frozen batch
    #[error("Batch {id} is not frozen")]
    BatchNotFrozen { id: BatchId },

    /// Batch or regulation changed between read and commit
    #[error("Batch {id} or its regulation changed during the operation")]
    ConcurrentModification { id: BatchId },

    /// Rows built for the snapshot do not hash to the checksum being stamped
    #[error("Snapshot for batch {id} hashes to {actual}, expected {expected}")]
    SnapshotMismatch {
        id: BatchId,
        expected: String,
        actual: String,
    },

    /// Payload or rule set failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rule store failure not covered above
    #[error("Rule store error: {0}")]
    RuleStore(RuleStoreError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

impl FreezeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FreezeError::BatchNotFound { .. }
            | FreezeError::BatchCodeNotFound { .. }
            | FreezeError::RegulationNotFound { .. } => ErrorCategory::NotFound,
            FreezeError::DuplicateBatchCode { .. }
            | FreezeError::BatchAlreadyFrozen { .. }
            | FreezeError::BatchNotFrozen { .. }
            | FreezeError::ConcurrentModification { .. } => ErrorCategory::Conflict,
            FreezeError::Validation(_) => ErrorCategory::Validation,
            FreezeError::RuleStore(e) => e.category(),
            FreezeError::SnapshotMismatch { .. } | FreezeError::Storage(_) => {
                ErrorCategory::Internal
            }
        }
    }
}

impl From<RuleStoreError> for FreezeError {
    fn from(e: RuleStoreError) -> Self {
        match e {
            RuleStoreError::RegulationNotFound { id } => FreezeError::RegulationNotFound { id },
            RuleStoreError::Validation(v) => FreezeError::Validation(v),
            RuleStoreError::Storage(s) => FreezeError::Storage(s),
            other => FreezeError::RuleStore(other),
        }
    }
}

/// Result type for freeze engine operations
pub type FreezeResult<T> = Result<T, FreezeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_frozen_is_conflict() {
        let err = FreezeError::BatchAlreadyFrozen {
            id: BatchId::new(),
            frozen_at: 5,
            checksum: "ab".repeat(32),
        };
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert_eq!(err.category().http_status(), 409);
    }

    #[test]
    fn test_rule_store_not_found_maps_through() {
        let id = RegulationId::new();
        let err: FreezeError = RuleStoreError::RegulationNotFound { id }.into();
        assert_eq!(err, FreezeError::RegulationNotFound { id });
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_snapshot_mismatch_is_internal() {
        let err = FreezeError::SnapshotMismatch {
            id: BatchId::new(),
            expected: "a".into(),
            actual: "b".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
