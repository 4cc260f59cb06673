//! # Commands
//!
//! Payloads accepted by the Rule Store. Each payload maps onto its entity
//! field by field; identity, ownership, lock and version fields are never
//! taken from a payload.

use serde::{Deserialize, Serialize};
use shared_types::{
    EvaluationScheme, MarksScheme, ProgramId, PromotionRuleId, PromotionRuleType, Regulation,
    RegulationId, RegulationPromotionRule, RegulationSemester, RegulationSubject, SemesterId,
    SubjectId, SubjectType, Timestamp,
};

/// Payload for creating a regulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRegulation {
    pub code: String,
    pub name: String,
    pub program_id: ProgramId,
    pub total_credits: f64,
    pub duration_years: u8,
    #[serde(default = "default_semesters_per_year")]
    pub semesters_per_year: u8,
    pub min_pass_percentage: f64,
    pub min_attendance_percentage: f64,
}

fn default_semesters_per_year() -> u8 {
    2
}

impl NewRegulation {
    pub fn into_regulation(self, now: Timestamp) -> Regulation {
        Regulation {
            id: RegulationId::new(),
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            program_id: self.program_id,
            total_credits: self.total_credits,
            duration_years: self.duration_years,
            semesters_per_year: self.semesters_per_year,
            min_pass_percentage: self.min_pass_percentage,
            min_attendance_percentage: self.min_attendance_percentage,
            is_locked: false,
            locked_at: None,
            locked_by: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a regulation's own fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegulationUpdate {
    pub name: Option<String>,
    pub total_credits: Option<f64>,
    pub duration_years: Option<u8>,
    pub semesters_per_year: Option<u8>,
    pub min_pass_percentage: Option<f64>,
    pub min_attendance_percentage: Option<f64>,
}

impl RegulationUpdate {
    /// Whether the update changes how semesters map onto years.
    pub fn changes_structure(&self, regulation: &Regulation) -> bool {
        self.duration_years
            .is_some_and(|d| d != regulation.duration_years)
            || self
                .semesters_per_year
                .is_some_and(|s| s != regulation.semesters_per_year)
    }

    pub fn apply_to(&self, regulation: &mut Regulation) {
        if let Some(name) = &self.name {
            regulation.name = name.trim().to_string();
        }
        if let Some(total_credits) = self.total_credits {
            regulation.total_credits = total_credits;
        }
        if let Some(duration_years) = self.duration_years {
            regulation.duration_years = duration_years;
        }
        if let Some(semesters_per_year) = self.semesters_per_year {
            regulation.semesters_per_year = semesters_per_year;
        }
        if let Some(pct) = self.min_pass_percentage {
            regulation.min_pass_percentage = pct;
        }
        if let Some(pct) = self.min_attendance_percentage {
            regulation.min_attendance_percentage = pct;
        }
    }
}

/// Payload for adding a semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSemester {
    pub semester_number: u8,
    pub total_credits: f64,
    pub min_credits_required: f64,
}

impl NewSemester {
    /// The academic year is derived from the regulation, never supplied.
    pub fn into_semester(self, regulation: &Regulation) -> RegulationSemester {
        RegulationSemester {
            id: SemesterId::new(),
            regulation_id: regulation.id,
            semester_number: self.semester_number,
            academic_year: regulation.academic_year_of(self.semester_number),
            total_credits: self.total_credits,
            min_credits_required: self.min_credits_required,
        }
    }
}

/// Partial update of a semester's credit thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemesterUpdate {
    pub total_credits: Option<f64>,
    pub min_credits_required: Option<f64>,
}

impl SemesterUpdate {
    pub fn apply_to(&self, semester: &mut RegulationSemester) {
        if let Some(total_credits) = self.total_credits {
            semester.total_credits = total_credits;
        }
        if let Some(min_credits_required) = self.min_credits_required {
            semester.min_credits_required = min_credits_required;
        }
    }
}

/// Payload for adding a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubject {
    pub semester_number: u8,
    pub code: String,
    pub name: String,
    pub subject_type: SubjectType,
    pub credits: f64,
    pub marks: MarksScheme,
    pub evaluation_scheme: EvaluationScheme,
}

impl NewSubject {
    pub fn into_subject(self, regulation_id: RegulationId) -> RegulationSubject {
        RegulationSubject {
            id: SubjectId::new(),
            regulation_id,
            semester_number: self.semester_number,
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            subject_type: self.subject_type,
            credits: self.credits,
            marks: self.marks,
            evaluation_scheme: self.evaluation_scheme,
        }
    }
}

/// Partial update of a subject. Code and semester are fixed once created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub subject_type: Option<SubjectType>,
    pub credits: Option<f64>,
    pub marks: Option<MarksScheme>,
    pub evaluation_scheme: Option<EvaluationScheme>,
}

impl SubjectUpdate {
    pub fn apply_to(&self, subject: &mut RegulationSubject) {
        if let Some(name) = &self.name {
            subject.name = name.trim().to_string();
        }
        if let Some(subject_type) = self.subject_type {
            subject.subject_type = subject_type;
        }
        if let Some(credits) = self.credits {
            subject.credits = credits;
        }
        if let Some(marks) = self.marks {
            subject.marks = marks;
        }
        if let Some(scheme) = self.evaluation_scheme {
            subject.evaluation_scheme = scheme;
        }
    }
}

/// Payload for adding a promotion rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPromotionRule {
    pub from_year: u8,
    pub to_year: u8,
    pub rule_type: PromotionRuleType,
    #[serde(default)]
    pub min_credits_required: Option<f64>,
    #[serde(default)]
    pub min_credit_percentage_required: Option<f64>,
    #[serde(default)]
    pub max_backlogs_allowed: Option<u32>,
}

impl NewPromotionRule {
    pub fn into_rule(self, regulation_id: RegulationId) -> RegulationPromotionRule {
        RegulationPromotionRule {
            id: PromotionRuleId::new(),
            regulation_id,
            from_year: self.from_year,
            to_year: self.to_year,
            rule_type: self.rule_type,
            min_credits_required: self.min_credits_required,
            min_credit_percentage_required: self.min_credit_percentage_required,
            max_backlogs_allowed: self.max_backlogs_allowed,
        }
    }
}

/// Partial update of a promotion rule's thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromotionRuleUpdate {
    pub min_credits_required: Option<f64>,
    pub min_credit_percentage_required: Option<f64>,
    pub max_backlogs_allowed: Option<u32>,
}

impl PromotionRuleUpdate {
    pub fn apply_to(&self, rule: &mut RegulationPromotionRule) {
        if let Some(credits) = self.min_credits_required {
            rule.min_credits_required = Some(credits);
        }
        if let Some(pct) = self.min_credit_percentage_required {
            rule.min_credit_percentage_required = Some(pct);
        }
        if let Some(backlogs) = self.max_backlogs_allowed {
            rule.max_backlogs_allowed = Some(backlogs);
        }
    }
}
