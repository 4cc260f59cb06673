//! # Rule Set Checksum
//!
//! SHA-256 over a canonical JSON rendering of a rule set.
//!
//! ## Canonical Form
//!
//! ```text
//! {"promotion_rules":[...],"regulation":{...},"semesters":[...],"subjects":[...]}
//! ```
//!
//! - Object keys sorted lexicographically at every level, no whitespace.
//! - `semesters` sorted by `semester_number`, `subjects` by
//!   `(semester_number, code)`, `promotion_rules` by
//!   `(from_year, to_year, rule_type)`. Ties fall back to the rendered row.
//! - Empty collections render as `[]`.
//! - Floats render as strings in their shortest round-trip form (`"3"`,
//!   `"20.00004"`), so every representable change shows; `-0.0` renders as
//!   `"0"`.
//! - Row ids, lock state, versions and freeze stamps are excluded, so a
//!   regulation and the snapshot frozen from it render identically.

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use shared_types::{
    BatchPromotionRule, BatchRegulationTerms, BatchSemester, BatchSnapshot, BatchSubject,
    EvaluationScheme, MarksScheme, ProgramId, PromotionRuleType, Regulation,
    RegulationPromotionRule, RegulationRuleSet, RegulationSemester, RegulationSubject,
    SubjectType,
};
use std::cmp::Ordering;

/// Length of a hex-encoded checksum.
pub const CHECKSUM_HEX_LEN: usize = 64;

/// Checksum of a live regulation rule set.
pub fn checksum_rule_set(rule_set: &RegulationRuleSet) -> String {
    digest(&canonical_rule_set(rule_set))
}

/// Checksum recomputed from a batch's frozen rows.
pub fn checksum_snapshot(snapshot: &BatchSnapshot) -> String {
    digest(&canonical_snapshot(snapshot))
}

pub fn canonical_rule_set(rule_set: &RegulationRuleSet) -> String {
    render(
        Terms::from(&rule_set.regulation),
        rule_set.semesters.iter().map(SemesterRow::from).collect(),
        rule_set.subjects.iter().map(SubjectRow::from).collect(),
        rule_set.promotion_rules.iter().map(RuleRow::from).collect(),
    )
}

pub fn canonical_snapshot(snapshot: &BatchSnapshot) -> String {
    render(
        Terms::from(&snapshot.terms),
        snapshot.semesters.iter().map(SemesterRow::from).collect(),
        snapshot.subjects.iter().map(SubjectRow::from).collect(),
        snapshot.promotion_rules.iter().map(RuleRow::from).collect(),
    )
}

/// Lowercase hex SHA-256 of the canonical text.
pub fn digest(canonical: &str) -> String {
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Whether `value` has the shape of a checksum produced here.
pub fn is_well_formed(value: &str) -> bool {
    value.len() == CHECKSUM_HEX_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

// =============================================================================
// Canonical rows
// =============================================================================

struct Terms<'a> {
    code: &'a str,
    name: &'a str,
    program_id: ProgramId,
    total_credits: f64,
    duration_years: u8,
    semesters_per_year: u8,
    min_pass_percentage: f64,
    min_attendance_percentage: f64,
}

impl<'a> From<&'a Regulation> for Terms<'a> {
    fn from(r: &'a Regulation) -> Self {
        Self {
            code: &r.code,
            name: &r.name,
            program_id: r.program_id,
            total_credits: r.total_credits,
            duration_years: r.duration_years,
            semesters_per_year: r.semesters_per_year,
            min_pass_percentage: r.min_pass_percentage,
            min_attendance_percentage: r.min_attendance_percentage,
        }
    }
}

impl<'a> From<&'a BatchRegulationTerms> for Terms<'a> {
    fn from(t: &'a BatchRegulationTerms) -> Self {
        Self {
            code: &t.code,
            name: &t.name,
            program_id: t.program_id,
            total_credits: t.total_credits,
            duration_years: t.duration_years,
            semesters_per_year: t.semesters_per_year,
            min_pass_percentage: t.min_pass_percentage,
            min_attendance_percentage: t.min_attendance_percentage,
        }
    }
}

impl Terms<'_> {
    fn to_value(&self) -> Value {
        json!({
            "code": self.code,
            "name": self.name,
            "program_id": self.program_id.to_string(),
            "total_credits": decimal(self.total_credits),
            "duration_years": self.duration_years,
            "semesters_per_year": self.semesters_per_year,
            "min_pass_percentage": decimal(self.min_pass_percentage),
            "min_attendance_percentage": decimal(self.min_attendance_percentage),
        })
    }
}

struct SemesterRow {
    semester_number: u8,
    academic_year: u8,
    total_credits: f64,
    min_credits_required: f64,
}

impl From<&RegulationSemester> for SemesterRow {
    fn from(s: &RegulationSemester) -> Self {
        Self {
            semester_number: s.semester_number,
            academic_year: s.academic_year,
            total_credits: s.total_credits,
            min_credits_required: s.min_credits_required,
        }
    }
}

impl From<&BatchSemester> for SemesterRow {
    fn from(s: &BatchSemester) -> Self {
        Self {
            semester_number: s.semester_number,
            academic_year: s.academic_year,
            total_credits: s.total_credits,
            min_credits_required: s.min_credits_required,
        }
    }
}

struct SubjectRow<'a> {
    semester_number: u8,
    code: &'a str,
    name: &'a str,
    subject_type: SubjectType,
    credits: f64,
    marks: MarksScheme,
    evaluation_scheme: EvaluationScheme,
}

impl<'a> From<&'a RegulationSubject> for SubjectRow<'a> {
    fn from(s: &'a RegulationSubject) -> Self {
        Self {
            semester_number: s.semester_number,
            code: &s.code,
            name: &s.name,
            subject_type: s.subject_type,
            credits: s.credits,
            marks: s.marks,
            evaluation_scheme: s.evaluation_scheme,
        }
    }
}

impl<'a> From<&'a BatchSubject> for SubjectRow<'a> {
    fn from(s: &'a BatchSubject) -> Self {
        Self {
            semester_number: s.semester_number,
            code: &s.code,
            name: &s.name,
            subject_type: s.subject_type,
            credits: s.credits,
            marks: s.marks,
            evaluation_scheme: s.evaluation_scheme,
        }
    }
}

struct RuleRow {
    from_year: u8,
    to_year: u8,
    rule_type: PromotionRuleType,
    min_credits_required: Option<f64>,
    min_credit_percentage_required: Option<f64>,
    max_backlogs_allowed: Option<u32>,
}

impl From<&RegulationPromotionRule> for RuleRow {
    fn from(r: &RegulationPromotionRule) -> Self {
        Self {
            from_year: r.from_year,
            to_year: r.to_year,
            rule_type: r.rule_type,
            min_credits_required: r.min_credits_required,
            min_credit_percentage_required: r.min_credit_percentage_required,
            max_backlogs_allowed: r.max_backlogs_allowed,
        }
    }
}

impl From<&BatchPromotionRule> for RuleRow {
    fn from(r: &BatchPromotionRule) -> Self {
        Self {
            from_year: r.from_year,
            to_year: r.to_year,
            rule_type: r.rule_type,
            min_credits_required: r.min_credits_required,
            min_credit_percentage_required: r.min_credit_percentage_required,
            max_backlogs_allowed: r.max_backlogs_allowed,
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn render(
    terms: Terms<'_>,
    semesters: Vec<SemesterRow>,
    subjects: Vec<SubjectRow<'_>>,
    rules: Vec<RuleRow>,
) -> String {
    let semesters = sorted_values(
        semesters.iter().map(|s| {
            let value = json!({
                "semester_number": s.semester_number,
                "academic_year": s.academic_year,
                "total_credits": decimal(s.total_credits),
                "min_credits_required": decimal(s.min_credits_required),
            });
            (format!("{:03}", s.semester_number), value)
        }),
    );

    let subjects = sorted_values(subjects.iter().map(|s| {
        let value = json!({
            "semester_number": s.semester_number,
            "code": s.code,
            "name": s.name,
            "subject_type": s.subject_type.as_str(),
            "credits": decimal(s.credits),
            "internal_max_marks": s.marks.internal_max_marks,
            "external_max_marks": s.marks.external_max_marks,
            "internal_pass_marks": s.marks.internal_pass_marks,
            "external_pass_marks": s.marks.external_pass_marks,
            "total_pass_marks": s.marks.total_pass_marks,
            "evaluation_scheme": s.evaluation_scheme.as_str(),
        });
        (format!("{:03}:{}", s.semester_number, s.code), value)
    }));

    let rules = sorted_values(rules.iter().map(|r| {
        let value = json!({
            "from_year": r.from_year,
            "to_year": r.to_year,
            "rule_type": r.rule_type.as_str(),
            "min_credits_required": r.min_credits_required.map(decimal),
            "min_credit_percentage_required": r.min_credit_percentage_required.map(decimal),
            "max_backlogs_allowed": r.max_backlogs_allowed,
        });
        (
            format!("{:03}:{:03}:{}", r.from_year, r.to_year, r.rule_type.as_str()),
            value,
        )
    }));

    let mut root = Map::new();
    root.insert("regulation".into(), terms.to_value());
    root.insert("semesters".into(), Value::Array(semesters));
    root.insert("subjects".into(), Value::Array(subjects));
    root.insert("promotion_rules".into(), Value::Array(rules));

    let mut out = String::new();
    write_canonical(&Value::Object(root), &mut out);
    out
}

/// Order rows by sort key. Equal keys are ordered by their rendering so the
/// output never depends on input order.
fn sorted_values(rows: impl Iterator<Item = (String, Value)>) -> Vec<Value> {
    let mut rendered: Vec<(String, String, Value)> = rows
        .map(|(key, value)| {
            let mut text = String::new();
            write_canonical(&value, &mut text);
            (key, text, value)
        })
        .collect();
    rendered.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });
    rendered.into_iter().map(|(_, _, value)| value).collect()
}

fn decimal(value: f64) -> Value {
    let value = if value == 0.0 { 0.0 } else { value };
    Value::String(value.to_string())
}

/// Compact JSON with object keys sorted at every level.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
