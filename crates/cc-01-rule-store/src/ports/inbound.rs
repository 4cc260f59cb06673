//! # Inbound Ports (Driving Ports)
//!
//! The primary API for the Rule Store.

use crate::domain::commands::{
    NewPromotionRule, NewRegulation, NewSemester, NewSubject, PromotionRuleUpdate,
    RegulationUpdate, SemesterUpdate, SubjectUpdate,
};
use crate::error::RuleStoreResult;
use shared_types::{
    PromotionRuleId, Regulation, RegulationId, RegulationPromotionRule, RegulationRuleSet,
    RegulationSemester, RegulationSubject, SemesterId, SubjectId, UserId,
};

/// Primary API for the Rule Store.
///
/// Every mutating call takes the `expected_version` the caller last read and
/// returns the entity as stored, so the caller can read the new version off
/// the regulation.
///
/// ## Errors
///
/// All mutating calls share the same preconditions:
///
/// - `RegulationNotFound`: No regulation with this id
/// - `RegulationLocked`: The regulation has been locked
/// - `VersionConflict`: `expected_version` is stale
/// - `Validation`: The payload is malformed
pub trait RuleStoreApi {
    /// Create a regulation at version 1.
    ///
    /// ## Errors
    ///
    /// - `DuplicateCode`: Another regulation already uses this code
    fn create_regulation(&self, new: NewRegulation) -> RuleStoreResult<Regulation>;

    fn get_regulation(&self, id: RegulationId) -> RuleStoreResult<Regulation>;

    fn find_regulation_by_code(&self, code: &str) -> RuleStoreResult<Regulation>;

    fn list_regulations(&self) -> RuleStoreResult<Vec<Regulation>>;

    /// Regulation plus its semesters, subjects and promotion rules.
    fn load_rule_set(&self, id: RegulationId) -> RuleStoreResult<RegulationRuleSet>;

    /// Update the regulation's own fields.
    ///
    /// `duration_years` and `semesters_per_year` can only change while the
    /// regulation has no semesters and no promotion rules.
    fn update_regulation(
        &self,
        id: RegulationId,
        expected_version: u64,
        update: RegulationUpdate,
    ) -> RuleStoreResult<Regulation>;

    /// Delete the regulation and every child row.
    fn delete_regulation(&self, id: RegulationId, expected_version: u64) -> RuleStoreResult<()>;

    /// Lock the regulation. Locking is one-way.
    ///
    /// ## Errors
    ///
    /// - `RegulationLocked`: Already locked
    fn lock_regulation(&self, id: RegulationId, actor: UserId) -> RuleStoreResult<Regulation>;

    fn add_semester(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewSemester,
    ) -> RuleStoreResult<RegulationSemester>;

    fn update_semester(
        &self,
        id: RegulationId,
        expected_version: u64,
        semester_id: SemesterId,
        update: SemesterUpdate,
    ) -> RuleStoreResult<RegulationSemester>;

    /// Remove a semester together with the subjects taught in it.
    fn remove_semester(
        &self,
        id: RegulationId,
        expected_version: u64,
        semester_id: SemesterId,
    ) -> RuleStoreResult<()>;

    /// Add a subject. Its semester must already exist.
    fn add_subject(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewSubject,
    ) -> RuleStoreResult<RegulationSubject>;

    fn update_subject(
        &self,
        id: RegulationId,
        expected_version: u64,
        subject_id: SubjectId,
        update: SubjectUpdate,
    ) -> RuleStoreResult<RegulationSubject>;

    fn remove_subject(
        &self,
        id: RegulationId,
        expected_version: u64,
        subject_id: SubjectId,
    ) -> RuleStoreResult<()>;

    fn add_promotion_rule(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewPromotionRule,
    ) -> RuleStoreResult<RegulationPromotionRule>;

    fn update_promotion_rule(
        &self,
        id: RegulationId,
        expected_version: u64,
        rule_id: PromotionRuleId,
        update: PromotionRuleUpdate,
    ) -> RuleStoreResult<RegulationPromotionRule>;

    fn remove_promotion_rule(
        &self,
        id: RegulationId,
        expected_version: u64,
        rule_id: PromotionRuleId,
    ) -> RuleStoreResult<()>;
}
