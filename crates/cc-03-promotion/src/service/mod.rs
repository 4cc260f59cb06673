//! # Promotion Evaluator Service
//!
//! Implements [`PromotionApi`] by reading the student's batch and history
//! through their ports and delegating the verdict to [`assess`].
//!
//! Only frozen batch rows are consulted. The regulation a batch was frozen
//! from is never read, so later regulation activity cannot change a verdict.


use crate::domain::{assess, EligibilityResult};
use crate::error::{PromotionError, PromotionResult};
use crate::ports::{AcademicHistoryProvider, PromotionApi};
use cc_02_freeze_engine::BatchRepository;
use shared_store::KeyValueStore;
use shared_types::StudentId;
use tracing::{debug, info};

/// The Promotion Evaluator.
pub struct PromotionEvaluator<KV: KeyValueStore, H: AcademicHistoryProvider> {
    batches: BatchRepository<KV>,
    history: H,
}

impl<KV: KeyValueStore, H: AcademicHistoryProvider> PromotionEvaluator<KV, H> {
    pub fn new(store: KV, history: H) -> Self {
        Self {
            batches: BatchRepository::new(store),
            history,
        }
    }

    pub fn history(&self) -> &H {
        &self.history
    }
}

impl<KV: KeyValueStore, H: AcademicHistoryProvider> PromotionApi for PromotionEvaluator<KV, H> {
    fn evaluate(
        &self,
        student_id: StudentId,
        target_year: u8,
        dry_run: bool,
    ) -> PromotionResult<EligibilityResult> {
        let batch_id = self
            .history
            .batch_of(student_id)?
            .ok_or(PromotionError::StudentNotEnrolled {
                student: student_id,
            })?;
        let snapshot = self.batches.load_snapshot(batch_id)?;
        let records = self.history.semester_records(student_id)?;
        debug!(
            student = %student_id,
            batch = %batch_id,
            records = records.len(),
            target_year,
            "evaluating promotion"
        );

        let result = assess(&snapshot, student_id, target_year, &records, dry_run)?;
        info!(
            student = %student_id,
            batch = %batch_id,
            from_year = result.from_year,
            to_year = result.to_year,
            eligible = result.eligible,
            violations = result.violations.len(),
            "promotion evaluated"
        );
        Ok(result)
    }
}
