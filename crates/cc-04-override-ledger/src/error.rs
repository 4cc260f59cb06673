//! Error types for the Override Ledger

use cc_02_freeze_engine::FreezeError;
use shared_store::KVStoreError;
use shared_types::{BatchId, ErrorCategory, OverrideRuleType, UserId};
use thiserror::Error;
use uuid::Uuid;

/// Override Ledger errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Reason is blank or shorter than the configured minimum
    #[error("Override reason must be at least {min_len} characters")]
    MissingReason { min_len: usize },

    /// Approver is not known to the approver directory
    #[error("Approver {approver} is not authorised to approve overrides")]
    UnknownApprover { approver: UserId },

    /// Configuration requires a supporting document reference
    #[error("Override requires a document reference")]
    MissingDocumentRef,

    /// Batch does not exist
    #[error("Batch not found: {id}")]
    BatchNotFound { id: BatchId },

    /// Overrides only apply to frozen rules
    #[error("Batch {id} is not frozen")]
    BatchNotFrozen { id: BatchId },

    /// Frozen row named by the override does not exist in the batch
    #[error("{rule_type} row {rule_id} not found in batch {batch_id}")]
    RuleNotFound {
        batch_id: BatchId,
        rule_type: OverrideRuleType,
        rule_id: Uuid,
    },

    /// Requested amendment cannot be applied to the row
    #[error("Invalid amendment: {reason}")]
    InvalidAmendment { reason: String },

    /// Batch, row or ledger slot changed between read and commit
    #[error("Batch {batch_id} changed while the override was being recorded")]
    ConcurrentModification { batch_id: BatchId },

    /// Snapshot read failure not covered above
    #[error("Snapshot error: {0}")]
    Snapshot(FreezeError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

impl LedgerError {
    pub fn invalid_amendment(reason: impl Into<String>) -> Self {
        LedgerError::InvalidAmendment {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::MissingReason { .. }
            | LedgerError::UnknownApprover { .. }
            | LedgerError::MissingDocumentRef
            | LedgerError::InvalidAmendment { .. } => ErrorCategory::Validation,
            LedgerError::BatchNotFound { .. } | LedgerError::RuleNotFound { .. } => {
                ErrorCategory::NotFound
            }
            LedgerError::BatchNotFrozen { .. } | LedgerError::ConcurrentModification { .. } => {
                ErrorCategory::Conflict
            }
            LedgerError::Snapshot(e) => e.category(),
            LedgerError::Storage(_) => ErrorCategory::Internal,
        }
    }
}

impl From<FreezeError> for LedgerError {
    fn from(e: FreezeError) -> Self {
        match e {
            FreezeError::BatchNotFound { id } => LedgerError::BatchNotFound { id },
            FreezeError::BatchNotFrozen { id } => LedgerError::BatchNotFrozen { id },
            FreezeError::Storage(s) => LedgerError::Storage(s),
            other => LedgerError::Snapshot(other),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
