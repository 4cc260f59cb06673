//! # Eligibility Assessment
//!
//! Pure evaluation of one student's year transition against a frozen batch
//! snapshot. Every rule for the transition is applied (logical AND) and every
//! unmet rule contributes a violation.

use crate::error::{PromotionError, PromotionResult};
use serde::{Deserialize, Serialize};
use shared_types::{
    BatchId, BatchPromotionRule, BatchPromotionRuleId, BatchSnapshot, PromotionRuleType,
    SemesterRecord, StudentId,
};
use std::collections::{BTreeMap, BTreeSet};

/// Tolerance for credit and percentage comparisons.
const EPSILON: f64 = 1e-9;

/// Outcome of a single promotion rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule_id: BatchPromotionRuleId,
    pub rule_type: PromotionRuleType,
    /// Threshold the rule demands (percentage, credits or backlog cap).
    pub threshold: f64,
    /// Value measured for the student, when measurable.
    pub actual: Option<f64>,
    pub passed: bool,
}

/// Verdict for one student and one year transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub student_id: StudentId,
    pub batch_id: BatchId,
    pub from_year: u8,
    pub to_year: u8,
    pub eligible: bool,
    pub earned_credits: f64,
    pub required_credits: f64,
    /// `earned / required * 100`; absent when the year carries no credits.
    pub credit_percentage: Option<f64>,
    pub backlog_count: u32,
    pub violations: Vec<String>,
    pub outcomes: Vec<RuleOutcome>,
    pub dry_run: bool,
}

/// Evaluate promotion into `target_year`.
///
/// `records` is the student's history in recording order; when a semester
/// was recorded more than once, the latest record counts.
pub fn assess(
    snapshot: &BatchSnapshot,
    student_id: StudentId,
    target_year: u8,
    records: &[SemesterRecord],
    dry_run: bool,
) -> PromotionResult<EligibilityResult> {
    if target_year < 2 {
        return Err(PromotionError::invalid(format!(
            "target year must be at least 2, got {}",
            target_year
        )));
    }
    let from_year = target_year - 1;
    let batch_id = snapshot.batch.id;

    let rules = snapshot.rules_for_transition(from_year, target_year);
    if rules.is_empty() {
        return Err(PromotionError::PromotionRuleNotFound {
            batch_id,
            from_year,
            to_year: target_year,
        });
    }

    let semesters = snapshot.semesters_of_year(from_year);
    if semesters.is_empty() {
        return Err(PromotionError::invalid(format!(
            "batch {} defines no semesters for year {}",
            batch_id, from_year
        )));
    }

    let latest = latest_records(records);
    let required_credits: f64 = semesters.iter().map(|s| s.total_credits).sum();
    let earned_credits: f64 = semesters
        .iter()
        .filter_map(|s| latest.get(&s.semester_number))
        .map(|r| r.earned_credits)
        .sum();
    let credit_percentage =
        (required_credits > 0.0).then(|| earned_credits / required_credits * 100.0);
    let backlog_count = count_backlogs(snapshot, &latest, from_year);

    let mut violations = Vec::new();
    let mut outcomes = Vec::with_capacity(rules.len());
    for rule in rules {
        let (outcome, violation) = apply_rule(
            rule,
            from_year,
            earned_credits,
            required_credits,
            credit_percentage,
            backlog_count,
        )?;
        outcomes.push(outcome);
        violations.extend(violation);
    }

    Ok(EligibilityResult {
        student_id,
        batch_id,
        from_year,
        to_year: target_year,
        eligible: violations.is_empty(),
        earned_credits,
        required_credits,
        credit_percentage,
        backlog_count,
        violations,
        outcomes,
        dry_run,
    })
}

fn latest_records(records: &[SemesterRecord]) -> BTreeMap<u8, &SemesterRecord> {
    let mut latest = BTreeMap::new();
    for record in records {
        latest.insert(record.semester_number, record);
    }
    latest
}

/// Distinct outstanding backlog subjects across every semester up to and
/// including `from_year`.
fn count_backlogs(
    snapshot: &BatchSnapshot,
    latest: &BTreeMap<u8, &SemesterRecord>,
    from_year: u8,
) -> u32 {
    let per_year = snapshot.terms.semesters_per_year.max(1);
    let year_of = |number: u8| {
        snapshot
            .semesters
            .iter()
            .find(|s| s.semester_number == number)
            .map(|s| s.academic_year)
            .unwrap_or_else(|| number.saturating_sub(1) / per_year + 1)
    };

    let codes: BTreeSet<&str> = latest
        .values()
        .filter(|r| year_of(r.semester_number) <= from_year)
        .flat_map(|r| r.backlog_subjects.iter().map(|c| c.trim()))
        .filter(|c| !c.is_empty())
        .collect();
    u32::try_from(codes.len()).unwrap_or(u32::MAX)
}

fn apply_rule(
    rule: &BatchPromotionRule,
    from_year: u8,
    earned: f64,
    required: f64,
    percentage: Option<f64>,
    backlogs: u32,
) -> PromotionResult<(RuleOutcome, Option<String>)> {
    let missing = |field: &str| {
        PromotionError::invalid(format!(
            "{} rule {} has no {}",
            rule.rule_type, rule.id, field
        ))
    };

    let (threshold, actual, violation) = match rule.rule_type {
        PromotionRuleType::CreditPercentage => {
            let threshold = rule
                .min_credit_percentage_required
                .ok_or_else(|| missing("min_credit_percentage_required"))?;
            let violation = match percentage {
                Some(pct) if pct + EPSILON >= threshold => None,
                Some(pct) => Some(format!(
                    "Earned {:.2}% of year {} credits ({}/{}); at least {:.2}% required",
                    pct, from_year, earned, required, threshold
                )),
                None => Some(format!(
                    "Year {} carries no credits to measure; at least {:.2}% required",
                    from_year, threshold
                )),
            };
            (threshold, percentage, violation)
        }
        PromotionRuleType::CreditCount => {
            let threshold = rule
                .min_credits_required
                .ok_or_else(|| missing("min_credits_required"))?;
            let violation = (earned + EPSILON < threshold).then(|| {
                format!(
                    "Earned {} credits in year {}; at least {} required",
                    earned, from_year, threshold
                )
            });
            (threshold, Some(earned), violation)
        }
        PromotionRuleType::BacklogCount => {
            let max = rule
                .max_backlogs_allowed
                .ok_or_else(|| missing("max_backlogs_allowed"))?;
            let violation = (backlogs > max).then(|| {
                format!(
                    "{} outstanding backlogs; at most {} allowed",
                    backlogs, max
                )
            });
            (f64::from(max), Some(f64::from(backlogs)), violation)
        }
    };

    let outcome = RuleOutcome {
        rule_id: rule.id,
        rule_type: rule.rule_type,
        threshold,
        actual,
        passed: violation.is_none(),
    };
    Ok((outcome, violation))
}
