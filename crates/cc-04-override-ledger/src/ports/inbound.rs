//! Inbound port for the override ledger.

use crate::domain::{AmendmentRequest, AuditReport, NewOverride};
use crate::error::LedgerResult;
use shared_types::{BatchId, BatchRuleOverride};

/// Override Ledger API.
///
/// The ledger is append-only: no operation updates or deletes an entry.
pub trait OverrideLedgerApi {
    /// Append an audit entry for a change made elsewhere.
    ///
    /// ## Errors
    ///
    /// - `MissingReason`: Reason blank or shorter than configured
    /// - `MissingDocumentRef`: Document required by configuration
    /// - `UnknownApprover`: Approver not in the directory
    /// - `BatchNotFound` / `BatchNotFrozen`: Batch absent or unfrozen
    /// - `ConcurrentModification`: Ledger slot kept being taken
    fn record_override(&self, new: NewOverride) -> LedgerResult<BatchRuleOverride>;

    /// Amend one frozen row and append its audit entry in a single write.
    ///
    /// Old and new values are captured from the row itself.
    fn apply_override(&self, request: AmendmentRequest) -> LedgerResult<BatchRuleOverride>;

    /// Ledger entries for a batch in sequence order. Entries survive
    /// deletion of the batch.
    fn list_overrides(&self, batch_id: BatchId) -> LedgerResult<Vec<BatchRuleOverride>>;

    /// Recompute the batch checksum and pair it with the ledger.
    fn audit_batch(&self, batch_id: BatchId) -> LedgerResult<AuditReport>;
}
