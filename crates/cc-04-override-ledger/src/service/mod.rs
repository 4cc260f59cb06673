//! # Override Ledger Service
//!
//! Implements [`OverrideLedgerApi`].
//!
//! Every append is one conditional write that expects the batch record to be
//! unchanged and the ledger slot to be empty. `apply_override` additionally
//! expects the amended row to be unchanged, so the row change and its audit
//! entry land together or not at all. When another append claims the slot
//! first, the whole request is rebuilt from fresh reads and retried.


use crate::domain::amendment::{amend_promotion_rule, amend_semester, amend_subject};
use crate::domain::request::PendingEntry;
use crate::domain::{
    AmendmentRequest, Approval, AuditReport, NewOverride, OverrideConfig, RuleAmendment,
};
use crate::error::{LedgerError, LedgerResult};
use crate::ports::{ApproverDirectory, OverrideLedgerApi};
use crate::repository::{append_operations, OverrideRepository};
use cc_02_freeze_engine::repository::{guard, put_row};
use cc_02_freeze_engine::{checksum_snapshot, BatchRepository, IntegrityReport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_store::{BatchOperation, KVStoreError, KeyPrefix, KeyValueStore, Stored, TimeSource};
use shared_types::{
    AcademicBatch, BatchId, BatchPromotionRule, BatchRuleOverride, BatchSemester, BatchSubject,
    OverrideRuleType,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The Override Ledger.
pub struct OverrideLedger<KV, TS, D>
where
    KV: KeyValueStore + Clone,
    TS: TimeSource,
    D: ApproverDirectory,
{
    batches: BatchRepository<KV>,
    ledger: OverrideRepository<KV>,
    directory: D,
    time_source: TS,
    config: OverrideConfig,
}

impl<KV, TS, D> OverrideLedger<KV, TS, D>
where
    KV: KeyValueStore + Clone,
    TS: TimeSource,
    D: ApproverDirectory,
{
    pub fn new(store: KV, time_source: TS, directory: D, config: OverrideConfig) -> Self {
        Self {
            batches: BatchRepository::new(store.clone()),
            ledger: OverrideRepository::new(store),
            directory,
            time_source,
            config,
        }
    }

    pub fn config(&self) -> &OverrideConfig {
        &self.config
    }

    fn admit(&self, approval: &Approval) -> LedgerResult<()> {
        approval.check(&self.config)?;
        if !self.directory.is_approver(approval.approved_by_id) {
            return Err(LedgerError::UnknownApprover {
                approver: approval.approved_by_id,
            });
        }
        Ok(())
    }

    fn load_frozen(&self, batch_id: BatchId) -> LedgerResult<Stored<AcademicBatch>> {
        let stored = self.batches.load(batch_id)?;
        if !stored.value.is_frozen() {
            return Err(LedgerError::BatchNotFrozen { id: batch_id });
        }
        Ok(stored)
    }

    fn load_row<T: DeserializeOwned>(
        &self,
        batch_id: BatchId,
        rule_type: OverrideRuleType,
        row_id: Uuid,
    ) -> LedgerResult<Stored<T>> {
        self.batches
            .row(row_prefix(rule_type), batch_id, row_id)?
            .ok_or(LedgerError::RuleNotFound {
                batch_id,
                rule_type,
                rule_id: row_id,
            })
    }

    /// Run `plan` against fresh reads and commit its entry at the next
    /// sequence, retrying when a concurrent append takes the slot.
    ///
    /// `plan` returns the entry to append plus any extra operations that
    /// must land with it.
    fn append<F>(&self, batch_id: BatchId, plan: F) -> LedgerResult<BatchRuleOverride>
    where
        F: Fn(&Stored<AcademicBatch>) -> LedgerResult<(PendingEntry, Vec<BatchOperation>)>,
    {
        let attempts = self.config.max_append_attempts.max(1);
        for attempt in 1..=attempts {
            let batch = self.load_frozen(batch_id)?;
            let (pending, extra) = plan(&batch)?;
            let sequence = self.ledger.next_sequence(batch_id)?;
            let entry = pending.into_entry(sequence, self.time_source.now());

            let mut operations = vec![guard(&batch)];
            operations.extend(extra);
            operations.extend(append_operations(&entry)?);

            match self.batches.store().atomic_batch_write(operations) {
                Ok(()) => return Ok(entry),
                Err(e) if e.is_precondition_failure() => {
                    debug!(batch = %batch_id, sequence, attempt, "override append raced");
                }
                Err(e) => return Err(e.into()),
            }
        }
        warn!(batch = %batch_id, attempts, "override append abandoned");
        Err(LedgerError::ConcurrentModification { batch_id })
    }

    fn amend<T, F>(
        &self,
        request: &AmendmentRequest,
        amend: F,
    ) -> LedgerResult<(PendingEntry, Vec<BatchOperation>)>
    where
        T: DeserializeOwned + Serialize,
        F: Fn(&T) -> LedgerResult<(T, Value, Value)>,
    {
        let rule_type = request.amendment.rule_type();
        let row_id = request.amendment.row_id();
        let stored: Stored<T> = self.load_row(request.batch_id, rule_type, row_id)?;
        let (row, old_value, new_value) = amend(&stored.value)?;

        let prefix = row_prefix(rule_type);
        let operations = vec![
            BatchOperation::expect_value(prefix.child_key(request.batch_id, row_id), stored.raw),
            put_row(prefix, request.batch_id, row_id, &row)?,
        ];
        let pending = PendingEntry {
            batch_id: request.batch_id,
            rule_type,
            rule_id: Some(row_id),
            old_value,
            new_value,
            approval: request.approval.clone(),
        };
        Ok((pending, operations))
    }
}

fn row_prefix(rule_type: OverrideRuleType) -> KeyPrefix {
    match rule_type {
        OverrideRuleType::Subject => KeyPrefix::BatchSubject,
        OverrideRuleType::Semester => KeyPrefix::BatchSemester,
        OverrideRuleType::PromotionRule => KeyPrefix::BatchPromotionRule,
    }
}

impl<KV, TS, D> OverrideLedgerApi for OverrideLedger<KV, TS, D>
where
    KV: KeyValueStore + Clone,
    TS: TimeSource,
    D: ApproverDirectory,
{
    fn record_override(&self, new: NewOverride) -> LedgerResult<BatchRuleOverride> {
        if let Err(e) = self.admit(&new.approval) {
            warn!(batch = %new.batch_id, error = %e, "override rejected");
            return Err(e);
        }
        let batch_id = new.batch_id;
        let pending = PendingEntry::from(new);

        let entry = self.append(batch_id, |_| {
            if let Some(row_id) = pending.rule_id {
                let key = row_prefix(pending.rule_type).child_key(batch_id, row_id);
                if !self.batches.store().exists(&key)? {
                    return Err(LedgerError::RuleNotFound {
                        batch_id,
                        rule_type: pending.rule_type,
                        rule_id: row_id,
                    });
                }
            }
            Ok((pending.clone(), Vec::new()))
        })?;

        info!(
            batch = %entry.batch_id,
            sequence = entry.sequence,
            rule_type = %entry.rule_type,
            approver = %entry.approved_by_id,
            "override recorded"
        );
        Ok(entry)
    }

    fn apply_override(&self, request: AmendmentRequest) -> LedgerResult<BatchRuleOverride> {
        if let Err(e) = self.admit(&request.approval) {
            warn!(batch = %request.batch_id, error = %e, "override rejected");
            return Err(e);
        }

        let entry = self.append(request.batch_id, |_| match &request.amendment {
            RuleAmendment::SubjectCredits { credits, .. } => {
                self.amend(&request, |row: &BatchSubject| amend_subject(row, *credits))
            }
            RuleAmendment::SemesterCredits {
                total_credits,
                min_credits_required,
                ..
            } => self.amend(&request, |row: &BatchSemester| {
                amend_semester(row, *total_credits, *min_credits_required)
            }),
            RuleAmendment::PromotionThreshold { threshold, .. } => {
                self.amend(&request, |row: &BatchPromotionRule| {
                    amend_promotion_rule(row, *threshold)
                })
            }
        })?;

        info!(
            batch = %entry.batch_id,
            sequence = entry.sequence,
            rule_type = %entry.rule_type,
            approver = %entry.approved_by_id,
            old = %entry.old_value,
            new = %entry.new_value,
            "override applied"
        );
        Ok(entry)
    }

    fn list_overrides(&self, batch_id: BatchId) -> LedgerResult<Vec<BatchRuleOverride>> {
        self.ledger.list(batch_id)
    }

    fn audit_batch(&self, batch_id: BatchId) -> LedgerResult<AuditReport> {
        let snapshot = self.batches.load_snapshot(batch_id)?;
        let stored_checksum = snapshot.batch.freeze_checksum.clone().ok_or_else(|| {
            KVStoreError::CorruptionError {
                message: format!("frozen batch {} has no checksum", batch_id),
            }
        })?;
        let integrity =
            IntegrityReport::new(batch_id, stored_checksum, checksum_snapshot(&snapshot));
        let report = AuditReport::new(integrity, self.ledger.list(batch_id)?);

        if !report.drift_explained {
            warn!(
                batch = %batch_id,
                stored = %report.integrity.stored_checksum,
                recomputed = %report.integrity.recomputed_checksum,
                "batch rules drifted without a recorded override"
            );
        } else {
            debug!(
                batch = %batch_id,
                matches = report.integrity.matches,
                overrides = report.overrides.len(),
                "batch audited"
            );
        }
        Ok(report)
    }
}
