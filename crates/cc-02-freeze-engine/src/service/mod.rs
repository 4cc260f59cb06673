//! # Freeze Engine Service
//!
//! Implements [`FreezeEngineApi`].
//!
//! ## Freeze Flow
//!
//! ```text
//! load batch (unfrozen) ──► load rule set ──► checksum ──► build rows
//!                                                              │
//!        commit ◄── lock regulation ops ◄── recompute + compare┘
//! ```
//!
//! The commit expects both the batch record and the regulation record to be
//! byte-identical to what was read. A concurrent freeze of the same batch
//! therefore fails its precondition and is reported as `BatchAlreadyFrozen`.


use crate::domain::checksum::{checksum_rule_set, checksum_snapshot};
use crate::domain::commands::NewBatch;
use crate::domain::config::FreezeConfig;
use crate::domain::integrity::IntegrityReport;
use crate::domain::snapshot::build_snapshot;
use crate::error::{FreezeError, FreezeResult};
use crate::ports::inbound::FreezeEngineApi;
use crate::repository::{self, BatchRepository};
use cc_01_rule_store::RegulationRepository;
use shared_store::{
    encode, BatchOperation, KVStoreError, KeyPrefix, KeyValueStore, Stored, TimeSource,
};
use shared_types::{
    AcademicBatch, BatchId, BatchSnapshot, Regulation, Timestamp, UserId, ValidationError,
};
use tracing::{debug, info, warn};

/// The Freeze Engine.
pub struct FreezeEngine<KV: KeyValueStore + Clone, TS: TimeSource> {
    batches: BatchRepository<KV>,
    regulations: RegulationRepository<KV>,
    time_source: TS,
    config: FreezeConfig,
}

impl<KV: KeyValueStore + Clone, TS: TimeSource> FreezeEngine<KV, TS> {
    pub fn new(store: KV, time_source: TS, config: FreezeConfig) -> Self {
        Self {
            batches: BatchRepository::new(store.clone()),
            regulations: RegulationRepository::new(store),
            time_source,
            config,
        }
    }

    pub fn config(&self) -> &FreezeConfig {
        &self.config
    }

    pub fn batches(&self) -> &BatchRepository<KV> {
        &self.batches
    }

    fn load_regulation_for(&self, new: &NewBatch) -> FreezeResult<Regulation> {
        new.validate()?;
        let regulation = self.regulations.load(new.regulation_id)?.into_inner();
        if regulation.program_id != new.program_id {
            return Err(ValidationError::new(
                "program_id",
                format!(
                    "regulation {} belongs to program {}, not {}",
                    regulation.code, regulation.program_id, new.program_id
                ),
            )
            .into());
        }
        Ok(regulation)
    }

    fn ensure_code_free(&self, code: &str) -> FreezeResult<()> {
        if self.batches.find_id_by_code(code)?.is_some() {
            return Err(FreezeError::DuplicateBatchCode {
                code: code.to_string(),
            });
        }
        Ok(())
    }

    /// Stamp `batch` from its regulation's current rule set and build every
    /// write of the freeze except the batch precondition.
    fn plan_freeze(
        &self,
        batch: AcademicBatch,
        actor: UserId,
        now: Timestamp,
    ) -> FreezeResult<(AcademicBatch, Vec<BatchOperation>)> {
        let stored_rules = self.regulations.load_rule_set(batch.regulation_id)?;
        let rule_set = &stored_rules.rule_set;

        if self.config.require_promotion_rules && rule_set.promotion_rules.is_empty() {
            return Err(ValidationError::new(
                "promotion_rules",
                format!(
                    "regulation {} defines no promotion rules",
                    rule_set.regulation.code
                ),
            )
            .into());
        }

        let checksum = checksum_rule_set(rule_set);

        let mut stamped = batch;
        stamped.regulation_code = Some(rule_set.regulation.code.clone());
        stamped.frozen_at = Some(now);
        stamped.frozen_by_id = Some(actor);
        stamped.freeze_checksum = Some(checksum.clone());

        let snapshot = build_snapshot(stamped, rule_set)?;
        verify_snapshot(&snapshot, &checksum)?;

        let mut operations = vec![stored_rules.guard()];
        operations.extend(repository::snapshot_operations(&snapshot)?);

        if !rule_set.regulation.is_locked {
            let stored_regulation = Stored {
                value: rule_set.regulation.clone(),
                raw: stored_rules.regulation_raw.clone(),
            };
            let (_, lock_ops) = self
                .regulations
                .lock_operations(&stored_regulation, actor, now)?;
            operations.extend(lock_ops);
        }

        debug!(
            batch = %snapshot.batch.id,
            semesters = snapshot.semesters.len(),
            subjects = snapshot.subjects.len(),
            promotion_rules = snapshot.promotion_rules.len(),
            "freeze planned"
        );
        Ok((snapshot.batch, operations))
    }

    /// Explain a failed freeze precondition from the batch's current state.
    fn explain_freeze_conflict(&self, batch_id: BatchId) -> FreezeError {
        match self.batches.load(batch_id) {
            Ok(current) => match already_frozen(&current.value) {
                Some(err) => err,
                None => FreezeError::ConcurrentModification { id: batch_id },
            },
            Err(e) => e,
        }
    }
}

fn already_frozen(batch: &AcademicBatch) -> Option<FreezeError> {
    batch.frozen_at.map(|frozen_at| FreezeError::BatchAlreadyFrozen {
        id: batch.id,
        frozen_at,
        checksum: batch.freeze_checksum.clone().unwrap_or_default(),
    })
}

/// The rows about to be written must hash to the checksum being stamped.
fn verify_snapshot(snapshot: &BatchSnapshot, expected: &str) -> FreezeResult<()> {
    let actual = checksum_snapshot(snapshot);
    if actual != expected {
        return Err(FreezeError::SnapshotMismatch {
            id: snapshot.batch.id,
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

fn code_operations(batch: &AcademicBatch) -> FreezeResult<Vec<BatchOperation>> {
    let code_key = KeyPrefix::BatchCode.key(&batch.code);
    Ok(vec![
        BatchOperation::expect_absent(code_key.clone()),
        BatchOperation::expect_absent(KeyPrefix::Batch.key(batch.id)),
        BatchOperation::put(code_key, encode(&batch.id)?),
    ])
}

impl<KV: KeyValueStore + Clone, TS: TimeSource> FreezeEngineApi for FreezeEngine<KV, TS> {
    fn register_batch(&self, new: NewBatch) -> FreezeResult<AcademicBatch> {
        self.load_regulation_for(&new)?;
        let batch = new.into_batch(self.time_source.now());
        self.ensure_code_free(&batch.code)?;

        let mut operations = code_operations(&batch)?;
        operations.push(repository::put_batch(&batch)?);
        match self.batches.store().atomic_batch_write(operations) {
            Ok(()) => {}
            Err(e) if e.is_precondition_failure() => {
                return Err(FreezeError::DuplicateBatchCode { code: batch.code })
            }
            Err(e) => return Err(e.into()),
        }

        info!(batch = %batch.id, code = %batch.code, regulation = %batch.regulation_id, "batch registered");
        Ok(batch)
    }

    fn freeze(&self, batch_id: BatchId, actor: UserId) -> FreezeResult<AcademicBatch> {
        let stored = self.batches.load(batch_id)?;
        if let Some(err) = already_frozen(&stored.value) {
            warn!(batch = %batch_id, "freeze rejected: already frozen");
            return Err(err);
        }

        let now = self.time_source.now();
        let (frozen, mut operations) = self.plan_freeze(stored.value.clone(), actor, now)?;
        operations.push(repository::guard(&stored));

        match self.batches.store().atomic_batch_write(operations) {
            Ok(()) => {}
            Err(e) if e.is_precondition_failure() => {
                let err = self.explain_freeze_conflict(batch_id);
                warn!(batch = %batch_id, error = %err, "freeze commit rejected");
                return Err(err);
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            batch = %frozen.id,
            regulation = %frozen.regulation_id,
            actor = %actor,
            checksum = frozen.freeze_checksum.as_deref().unwrap_or_default(),
            "batch frozen"
        );
        Ok(frozen)
    }

    fn register_and_freeze(&self, new: NewBatch, actor: UserId) -> FreezeResult<AcademicBatch> {
        self.load_regulation_for(&new)?;
        let now = self.time_source.now();
        let batch = new.into_batch(now);
        self.ensure_code_free(&batch.code)?;

        let (frozen, mut operations) = self.plan_freeze(batch, actor, now)?;
        operations.extend(code_operations(&frozen)?);

        match self.batches.store().atomic_batch_write(operations) {
            Ok(()) => {}
            Err(e) if e.is_precondition_failure() => {
                let err = if self.batches.find_id_by_code(&frozen.code)?.is_some() {
                    FreezeError::DuplicateBatchCode { code: frozen.code }
                } else {
                    FreezeError::ConcurrentModification { id: frozen.id }
                };
                warn!(error = %err, "register-and-freeze commit rejected");
                return Err(err);
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            batch = %frozen.id,
            code = %frozen.code,
            regulation = %frozen.regulation_id,
            actor = %actor,
            "batch registered and frozen"
        );
        Ok(frozen)
    }

    fn get_batch(&self, batch_id: BatchId) -> FreezeResult<AcademicBatch> {
        Ok(self.batches.load(batch_id)?.into_inner())
    }

    fn find_batch_by_code(&self, code: &str) -> FreezeResult<AcademicBatch> {
        let id = self.batches.find_id_by_code(code.trim())?.ok_or_else(|| {
            FreezeError::BatchCodeNotFound {
                code: code.to_string(),
            }
        })?;
        self.get_batch(id)
    }

    fn list_batches(&self) -> FreezeResult<Vec<AcademicBatch>> {
        self.batches.list()
    }

    fn load_snapshot(&self, batch_id: BatchId) -> FreezeResult<BatchSnapshot> {
        self.batches.load_snapshot(batch_id)
    }

    fn verify_integrity(&self, batch_id: BatchId) -> FreezeResult<IntegrityReport> {
        let snapshot = self.batches.load_snapshot(batch_id)?;
        let stored_checksum = snapshot.batch.freeze_checksum.clone().ok_or_else(|| {
            KVStoreError::CorruptionError {
                message: format!("frozen batch {} has no checksum", batch_id),
            }
        })?;
        let report = IntegrityReport::new(batch_id, stored_checksum, checksum_snapshot(&snapshot));

        if report.matches {
            debug!(batch = %batch_id, "integrity verified");
        } else {
            warn!(
                batch = %batch_id,
                stored = %report.stored_checksum,
                recomputed = %report.recomputed_checksum,
                "batch rules differ from the frozen checksum"
            );
        }
        Ok(report)
    }

    fn delete_batch(&self, batch_id: BatchId) -> FreezeResult<()> {
        let stored = self.batches.load(batch_id)?;
        let mut operations = vec![repository::guard(&stored)];
        operations.extend(self.batches.delete_operations(&stored.value)?);

        match self.batches.store().atomic_batch_write(operations) {
            Ok(()) => {}
            Err(e) if e.is_precondition_failure() => {
                return Err(FreezeError::ConcurrentModification { id: batch_id })
            }
            Err(e) => return Err(e.into()),
        }

        info!(batch = %batch_id, code = %stored.value.code, "batch deleted");
        Ok(())
    }
}
