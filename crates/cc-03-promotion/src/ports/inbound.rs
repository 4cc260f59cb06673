//! Inbound port for promotion evaluation.

use crate::domain::EligibilityResult;
use crate::error::PromotionResult;
use shared_types::StudentId;

/// Promotion Evaluator API.
pub trait PromotionApi {
    /// Decide whether `student_id` may move into `target_year`, judged only
    /// by the frozen rules of the student's batch.
    ///
    /// A dry run is the only mode offered: nothing is written and the
    /// result is flagged `dry_run`.
    ///
    /// ## Errors
    ///
    /// - `StudentNotEnrolled`: History knows no batch for the student
    /// - `BatchNotFound`: The student's batch does not exist
    /// - `BatchNotFrozen`: The batch has no frozen rules yet
    /// - `PromotionRuleNotFound`: No rule covers `target_year - 1 -> target_year`
    /// - `InvalidPromotion`: `target_year < 2`, a rule lacks its threshold, or
    ///   the source year defines no semesters
    fn evaluate(
        &self,
        student_id: StudentId,
        target_year: u8,
        dry_run: bool,
    ) -> PromotionResult<EligibilityResult>;
}
