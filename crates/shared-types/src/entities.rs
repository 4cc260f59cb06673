//! # Core Domain Entities
//!
//! Defines the academic entities of the regulation-freezing core.
//!
//! ## Clusters
//!
//! - **Rule Store**: `Regulation`, `RegulationSemester`, `RegulationSubject`,
//!   `RegulationPromotionRule`, `RegulationRuleSet`
//! - **Batch Snapshot**: `AcademicBatch`, `BatchRegulationTerms`,
//!   `BatchSemester`, `BatchSubject`, `BatchPromotionRule`, `BatchSnapshot`
//! - **Override Ledger**: `BatchRuleOverride`
//! - **Student History**: `SemesterRecord`

use crate::ids::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix timestamp in seconds since epoch.
pub type Timestamp = u64;

// =============================================================================
// CLUSTER A: THE RULE STORE
// =============================================================================

/// How a promotion rule decides eligibility for a year transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionRuleType {
    /// Earned credits as a percentage of the year's total credits.
    CreditPercentage,
    /// Absolute number of earned credits.
    CreditCount,
    /// Maximum number of outstanding failed subjects.
    BacklogCount,
}

impl PromotionRuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionRuleType::CreditPercentage => "CREDIT_PERCENTAGE",
            PromotionRuleType::CreditCount => "CREDIT_COUNT",
            PromotionRuleType::BacklogCount => "BACKLOG_COUNT",
        }
    }
}

impl fmt::Display for PromotionRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of subject offered in a semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectType {
    Theory,
    Practical,
    Project,
    Elective,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Theory => "THEORY",
            SubjectType::Practical => "PRACTICAL",
            SubjectType::Project => "PROJECT",
            SubjectType::Elective => "ELECTIVE",
        }
    }
}

/// How final marks are graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationScheme {
    /// Fixed grade boundaries.
    Absolute,
    /// Grades relative to the cohort distribution.
    Relative,
    /// Internal assessment only, no external examination.
    InternalOnly,
}

impl EvaluationScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationScheme::Absolute => "ABSOLUTE",
            EvaluationScheme::Relative => "RELATIVE",
            EvaluationScheme::InternalOnly => "INTERNAL_ONLY",
        }
    }
}

/// Marks structure of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MarksScheme {
    pub internal_max_marks: u32,
    pub external_max_marks: u32,
    pub internal_pass_marks: u32,
    pub external_pass_marks: u32,
    pub total_pass_marks: u32,
}

impl MarksScheme {
    pub fn total_max_marks(&self) -> u32 {
        self.internal_max_marks.saturating_add(self.external_max_marks)
    }
}

/// The mutable rule template for a program cohort.
///
/// Once `is_locked` is set, neither the regulation nor any of its child rows
/// may change through normal edit paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regulation {
    pub id: RegulationId,
    /// Unique short code, e.g. `R2024`.
    pub code: String,
    pub name: String,
    pub program_id: ProgramId,
    /// Credits required over the whole program.
    pub total_credits: f64,
    pub duration_years: u8,
    pub semesters_per_year: u8,
    pub min_pass_percentage: f64,
    pub min_attendance_percentage: f64,
    pub is_locked: bool,
    pub locked_at: Option<Timestamp>,
    pub locked_by: Option<UserId>,
    /// Optimistic concurrency counter, bumped on every edit of the
    /// regulation or any of its children.
    pub version: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Regulation {
    /// Number of semesters over the whole program.
    pub fn total_semesters(&self) -> u16 {
        u16::from(self.duration_years) * u16::from(self.semesters_per_year)
    }

    /// Academic year (1-based) that a semester falls into.
    pub fn academic_year_of(&self, semester_number: u8) -> u8 {
        let per_year = self.semesters_per_year.max(1);
        (semester_number.saturating_sub(1)) / per_year + 1
    }
}

/// A semester's credit thresholds within a regulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationSemester {
    pub id: SemesterId,
    pub regulation_id: RegulationId,
    pub semester_number: u8,
    pub academic_year: u8,
    pub total_credits: f64,
    pub min_credits_required: f64,
}

/// A subject's credit and marks structure within a regulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationSubject {
    pub id: SubjectId,
    pub regulation_id: RegulationId,
    pub semester_number: u8,
    pub code: String,
    pub name: String,
    pub subject_type: SubjectType,
    pub credits: f64,
    pub marks: MarksScheme,
    pub evaluation_scheme: EvaluationScheme,
}

/// A year-to-year promotion rule within a regulation.
///
/// Only the threshold matching `rule_type` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationPromotionRule {
    pub id: PromotionRuleId,
    pub regulation_id: RegulationId,
    pub from_year: u8,
    pub to_year: u8,
    pub rule_type: PromotionRuleType,
    pub min_credits_required: Option<f64>,
    pub min_credit_percentage_required: Option<f64>,
    pub max_backlogs_allowed: Option<u32>,
}

/// A regulation together with all of its child rule rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationRuleSet {
    pub regulation: Regulation,
    pub semesters: Vec<RegulationSemester>,
    pub subjects: Vec<RegulationSubject>,
    pub promotion_rules: Vec<RegulationPromotionRule>,
}

// =============================================================================
// CLUSTER B: THE BATCH SNAPSHOT
// =============================================================================

/// A cohort of students bound to exactly one regulation.
///
/// `regulation_code`, `frozen_at`, `frozen_by_id` and `freeze_checksum` are
/// written together by the freeze engine and are `None` before freezing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicBatch {
    pub id: BatchId,
    /// Unique batch code, e.g. `CSE-2024`.
    pub code: String,
    pub name: String,
    pub program_id: ProgramId,
    pub admission_year: u16,
    pub regulation_id: RegulationId,
    pub regulation_code: Option<String>,
    pub frozen_at: Option<Timestamp>,
    pub frozen_by_id: Option<UserId>,
    pub freeze_checksum: Option<String>,
    pub created_at: Timestamp,
}

impl AcademicBatch {
    pub fn is_frozen(&self) -> bool {
        self.frozen_at.is_some()
    }
}

/// Frozen copy of the regulation's identity and global numeric rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRegulationTerms {
    pub batch_id: BatchId,
    pub regulation_id: RegulationId,
    pub code: String,
    pub name: String,
    pub program_id: ProgramId,
    pub total_credits: f64,
    pub duration_years: u8,
    pub semesters_per_year: u8,
    pub min_pass_percentage: f64,
    pub min_attendance_percentage: f64,
}

impl BatchRegulationTerms {
    pub fn from_regulation(batch_id: BatchId, regulation: &Regulation) -> Self {
        Self {
            batch_id,
            regulation_id: regulation.id,
            code: regulation.code.clone(),
            name: regulation.name.clone(),
            program_id: regulation.program_id,
            total_credits: regulation.total_credits,
            duration_years: regulation.duration_years,
            semesters_per_year: regulation.semesters_per_year,
            min_pass_percentage: regulation.min_pass_percentage,
            min_attendance_percentage: regulation.min_attendance_percentage,
        }
    }
}

/// Frozen semester credit thresholds for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSemester {
    pub id: BatchSemesterId,
    pub batch_id: BatchId,
    pub source_semester_id: SemesterId,
    pub semester_number: u8,
    pub academic_year: u8,
    pub total_credits: f64,
    pub min_credits_required: f64,
}

impl BatchSemester {
    pub fn from_regulation(batch_id: BatchId, semester: &RegulationSemester) -> Self {
        Self {
            id: BatchSemesterId::new(),
            batch_id,
            source_semester_id: semester.id,
            semester_number: semester.semester_number,
            academic_year: semester.academic_year,
            total_credits: semester.total_credits,
            min_credits_required: semester.min_credits_required,
        }
    }
}

/// Frozen subject structure for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSubject {
    pub id: BatchSubjectId,
    pub batch_id: BatchId,
    pub batch_semester_id: BatchSemesterId,
    /// Traceability link to the regulation row this was copied from.
    pub source_subject_id: SubjectId,
    pub semester_number: u8,
    pub code: String,
    pub name: String,
    pub subject_type: SubjectType,
    pub credits: f64,
    pub marks: MarksScheme,
    pub evaluation_scheme: EvaluationScheme,
}

impl BatchSubject {
    pub fn from_regulation(
        batch_id: BatchId,
        batch_semester_id: BatchSemesterId,
        subject: &RegulationSubject,
    ) -> Self {
        Self {
            id: BatchSubjectId::new(),
            batch_id,
            batch_semester_id,
            source_subject_id: subject.id,
            semester_number: subject.semester_number,
            code: subject.code.clone(),
            name: subject.name.clone(),
            subject_type: subject.subject_type,
            credits: subject.credits,
            marks: subject.marks,
            evaluation_scheme: subject.evaluation_scheme,
        }
    }
}

/// Frozen promotion rule for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPromotionRule {
    pub id: BatchPromotionRuleId,
    pub batch_id: BatchId,
    pub source_rule_id: PromotionRuleId,
    pub from_year: u8,
    pub to_year: u8,
    pub rule_type: PromotionRuleType,
    pub min_credits_required: Option<f64>,
    pub min_credit_percentage_required: Option<f64>,
    pub max_backlogs_allowed: Option<u32>,
}

impl BatchPromotionRule {
    pub fn from_regulation(batch_id: BatchId, rule: &RegulationPromotionRule) -> Self {
        Self {
            id: BatchPromotionRuleId::new(),
            batch_id,
            source_rule_id: rule.id,
            from_year: rule.from_year,
            to_year: rule.to_year,
            rule_type: rule.rule_type,
            min_credits_required: rule.min_credits_required,
            min_credit_percentage_required: rule.min_credit_percentage_required,
            max_backlogs_allowed: rule.max_backlogs_allowed,
        }
    }
}

/// A frozen batch together with all of its snapshot rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub batch: AcademicBatch,
    pub terms: BatchRegulationTerms,
    pub semesters: Vec<BatchSemester>,
    pub subjects: Vec<BatchSubject>,
    pub promotion_rules: Vec<BatchPromotionRule>,
}

impl BatchSnapshot {
    /// Semesters belonging to one academic year, ordered by number.
    pub fn semesters_of_year(&self, academic_year: u8) -> Vec<&BatchSemester> {
        let mut semesters: Vec<_> = self
            .semesters
            .iter()
            .filter(|s| s.academic_year == academic_year)
            .collect();
        semesters.sort_by_key(|s| s.semester_number);
        semesters
    }

    /// Promotion rules governing the `from_year -> to_year` transition.
    pub fn rules_for_transition(&self, from_year: u8, to_year: u8) -> Vec<&BatchPromotionRule> {
        let mut rules: Vec<_> = self
            .promotion_rules
            .iter()
            .filter(|r| r.from_year == from_year && r.to_year == to_year)
            .collect();
        rules.sort_by_key(|r| r.rule_type);
        rules
    }
}

// =============================================================================
// CLUSTER C: THE OVERRIDE LEDGER
// =============================================================================

/// Which kind of frozen row an override touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideRuleType {
    Subject,
    Semester,
    PromotionRule,
}

impl OverrideRuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideRuleType::Subject => "SUBJECT",
            OverrideRuleType::Semester => "SEMESTER",
            OverrideRuleType::PromotionRule => "PROMOTION_RULE",
        }
    }
}

impl fmt::Display for OverrideRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record of an exceptional change to a frozen rule.
///
/// Holds only a weak reference to its batch: the ledger outlives batch
/// deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRuleOverride {
    pub id: OverrideId,
    pub batch_id: BatchId,
    /// Position in the batch's ledger, starting at 1.
    pub sequence: u64,
    pub rule_type: OverrideRuleType,
    /// Frozen row the override applies to, when known.
    pub rule_id: Option<uuid::Uuid>,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
    pub reason: String,
    pub document_ref: Option<String>,
    pub approved_by_id: UserId,
    pub created_at: Timestamp,
}

// =============================================================================
// CLUSTER D: STUDENT HISTORY (read-only, owned by the Student subsystem)
// =============================================================================

/// A student's recorded result for one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterRecord {
    pub student_id: StudentId,
    pub semester_number: u8,
    pub earned_credits: f64,
    /// Codes of subjects failed and not yet cleared.
    #[serde(default)]
    pub backlog_subjects: Vec<String>,
}
