//! # Inbound Ports (Driving Ports)
//!
//! The primary API for the Freeze Engine.

use crate::domain::commands::NewBatch;
use crate::domain::integrity::IntegrityReport;
use crate::error::FreezeResult;
use shared_types::{AcademicBatch, BatchId, BatchSnapshot, UserId};

/// Primary API for the Freeze Engine.
pub trait FreezeEngineApi {
    /// Register an unfrozen batch under an existing regulation.
    ///
    /// ## Errors
    ///
    /// - `RegulationNotFound`: The regulation does not exist
    /// - `DuplicateBatchCode`: Another batch already uses this code
    /// - `Validation`: Malformed payload, or the program differs from the
    ///   regulation's program
    fn register_batch(&self, new: NewBatch) -> FreezeResult<AcademicBatch>;

    /// Freeze the batch's rules.
    ///
    /// ## Atomicity
    ///
    /// Snapshot rows, batch stamps and the regulation lock are one
    /// conditional write. Any failure leaves no snapshot rows behind and the
    /// regulation unlocked.
    ///
    /// ## Errors
    ///
    /// - `BatchNotFound`: No batch with this id
    /// - `RegulationNotFound`: The batch's regulation does not exist
    /// - `BatchAlreadyFrozen`: The batch was frozen before (or concurrently)
    /// - `ConcurrentModification`: The batch or regulation changed mid-freeze
    /// - `SnapshotMismatch`: Built rows do not hash to the stamped checksum
    fn freeze(&self, batch_id: BatchId, actor: UserId) -> FreezeResult<AcademicBatch>;

    /// Register a batch and freeze it in the same write.
    fn register_and_freeze(&self, new: NewBatch, actor: UserId) -> FreezeResult<AcademicBatch>;

    fn get_batch(&self, batch_id: BatchId) -> FreezeResult<AcademicBatch>;

    fn find_batch_by_code(&self, code: &str) -> FreezeResult<AcademicBatch>;

    fn list_batches(&self) -> FreezeResult<Vec<AcademicBatch>>;

    /// Frozen batch plus its snapshot rows.
    ///
    /// ## Errors
    ///
    /// - `BatchNotFrozen`: The batch has not been frozen
    fn load_snapshot(&self, batch_id: BatchId) -> FreezeResult<BatchSnapshot>;

    /// Recompute the checksum from the batch rows and compare it with the
    /// stamped one.
    fn verify_integrity(&self, batch_id: BatchId) -> FreezeResult<IntegrityReport>;

    /// Delete the batch and its snapshot rows. The override ledger stays.
    fn delete_batch(&self, batch_id: BatchId) -> FreezeResult<()>;
}
