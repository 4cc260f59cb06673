//! Error types for the Promotion Evaluator

use cc_02_freeze_engine::FreezeError;
use shared_store::KVStoreError;
use shared_types::{BatchId, ErrorCategory, StudentId};
use thiserror::Error;

/// Failure reported by an academic-history provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Academic history unavailable: {message}")]
pub struct HistoryError {
    pub message: String,
}

impl HistoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Promotion Evaluator errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PromotionError {
    /// Student's batch does not exist
    #[error("Batch not found: {id}")]
    BatchNotFound { id: BatchId },

    /// Student is not enrolled in any batch
    #[error("Student {student} is not enrolled in a batch")]
    StudentNotEnrolled { student: StudentId },

    /// Student's batch has no frozen rules to evaluate against
    #[error("Batch {id} is not frozen")]
    BatchNotFrozen { id: BatchId },

    /// Batch defines no rule for the requested transition
    #[error("No promotion rule for year {from_year} -> {to_year} in batch {batch_id}")]
    PromotionRuleNotFound {
        batch_id: BatchId,
        from_year: u8,
        to_year: u8,
    },

    /// Request or frozen rule cannot be evaluated
    #[error("Invalid promotion: {reason}")]
    InvalidPromotion { reason: String },

    /// History provider failed
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Snapshot could not be read
    #[error("Snapshot error: {0}")]
    Snapshot(FreezeError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

impl PromotionError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        PromotionError::InvalidPromotion {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PromotionError::BatchNotFound { .. }
            | PromotionError::StudentNotEnrolled { .. }
            | PromotionError::PromotionRuleNotFound { .. } => ErrorCategory::NotFound,
            PromotionError::BatchNotFrozen { .. } => ErrorCategory::Conflict,
            PromotionError::InvalidPromotion { .. } => ErrorCategory::Validation,
            PromotionError::Snapshot(e) => e.category(),
            PromotionError::History(_) | PromotionError::Storage(_) => ErrorCategory::Internal,
        }
    }
}

impl From<FreezeError> for PromotionError {
    fn from(e: FreezeError) -> Self {
        match e {
            FreezeError::BatchNotFound { id } => PromotionError::BatchNotFound { id },
            FreezeError::BatchNotFrozen { id } => PromotionError::BatchNotFrozen { id },
            FreezeError::Storage(s) => PromotionError::Storage(s),
            other => PromotionError::Snapshot(other),
        }
    }
}

/// Result type for promotion operations
pub type PromotionResult<T> = Result<T, PromotionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_rule_is_not_found() {
        let err = PromotionError::PromotionRuleNotFound {
            batch_id: BatchId::new(),
            from_year: 1,
            to_year: 2,
        };
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.to_string().contains("year 1 -> 2"));
    }

    #[test]
    fn test_freeze_errors_map_through() {
        let id = BatchId::new();
        let err: PromotionError = FreezeError::BatchNotFrozen { id }.into();
        assert_eq!(err, PromotionError::BatchNotFrozen { id });
    }
}
