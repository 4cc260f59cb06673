//! Pure application of a [`RuleAmendment`] to a frozen row.
//!
//! Each function returns the amended row together with the before and after
//! values that go into the ledger entry.

use crate::error::{LedgerError, LedgerResult};
use serde_json::{json, Map, Value};
use shared_types::{BatchPromotionRule, BatchSemester, BatchSubject, PromotionRuleType};

/// Amended row plus the ledger's `old_value` and `new_value`.
pub type Amended<T> = (T, Value, Value);

fn non_negative(field: &str, value: f64) -> LedgerResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(LedgerError::invalid_amendment(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(value)
}

fn unchanged(what: &str) -> LedgerError {
    LedgerError::invalid_amendment(format!("{} already has the requested value", what))
}

pub fn amend_subject(subject: &BatchSubject, credits: f64) -> LedgerResult<Amended<BatchSubject>> {
    let credits = non_negative("credits", credits)?;
    if credits == subject.credits {
        return Err(unchanged(&format!("subject {}", subject.code)));
    }
    let mut amended = subject.clone();
    amended.credits = credits;
    Ok((
        amended,
        json!({ "code": subject.code, "credits": subject.credits }),
        json!({ "code": subject.code, "credits": credits }),
    ))
}

pub fn amend_semester(
    semester: &BatchSemester,
    total_credits: Option<f64>,
    min_credits_required: Option<f64>,
) -> LedgerResult<Amended<BatchSemester>> {
    if total_credits.is_none() && min_credits_required.is_none() {
        return Err(LedgerError::invalid_amendment(
            "semester amendment changes neither total nor minimum credits",
        ));
    }
    let mut amended = semester.clone();
    if let Some(total) = total_credits {
        amended.total_credits = non_negative("total_credits", total)?;
    }
    if let Some(min) = min_credits_required {
        amended.min_credits_required = non_negative("min_credits_required", min)?;
    }
    if amended.min_credits_required > amended.total_credits {
        return Err(LedgerError::invalid_amendment(format!(
            "min_credits_required {} exceeds total_credits {}",
            amended.min_credits_required, amended.total_credits
        )));
    }
    if amended == *semester {
        return Err(unchanged(&format!("semester {}", semester.semester_number)));
    }
    let view = |s: &BatchSemester| {
        json!({
            "semester_number": s.semester_number,
            "total_credits": s.total_credits,
            "min_credits_required": s.min_credits_required,
        })
    };
    let (old_value, new_value) = (view(semester), view(&amended));
    Ok((amended, old_value, new_value))
}

pub fn amend_promotion_rule(
    rule: &BatchPromotionRule,
    threshold: f64,
) -> LedgerResult<Amended<BatchPromotionRule>> {
    let mut amended = rule.clone();
    let (field, old) = match rule.rule_type {
        PromotionRuleType::CreditPercentage => {
            let pct = non_negative("threshold", threshold)?;
            if pct > 100.0 {
                return Err(LedgerError::invalid_amendment(format!(
                    "credit percentage {} exceeds 100",
                    pct
                )));
            }
            amended.min_credit_percentage_required = Some(pct);
            (
                "min_credit_percentage_required",
                json!(rule.min_credit_percentage_required),
            )
        }
        PromotionRuleType::CreditCount => {
            amended.min_credits_required = Some(non_negative("threshold", threshold)?);
            ("min_credits_required", json!(rule.min_credits_required))
        }
        PromotionRuleType::BacklogCount => {
            let max = non_negative("threshold", threshold)?;
            if max.fract() != 0.0 || max > f64::from(u32::MAX) {
                return Err(LedgerError::invalid_amendment(format!(
                    "backlog allowance must be a whole number, got {}",
                    threshold
                )));
            }
            // Whole and within range, checked above.
            amended.max_backlogs_allowed = Some(max as u32);
            ("max_backlogs_allowed", json!(rule.max_backlogs_allowed))
        }
    };
    if amended == *rule {
        return Err(unchanged(&format!("{} rule", rule.rule_type)));
    }
    let new = match rule.rule_type {
        PromotionRuleType::CreditPercentage => json!(amended.min_credit_percentage_required),
        PromotionRuleType::CreditCount => json!(amended.min_credits_required),
        PromotionRuleType::BacklogCount => json!(amended.max_backlogs_allowed),
    };
    let view = |threshold: Value| {
        let mut map = Map::new();
        map.insert(
            "transition".into(),
            json!(format!("{}->{}", rule.from_year, rule.to_year)),
        );
        map.insert("rule_type".into(), json!(rule.rule_type.as_str()));
        map.insert(field.into(), threshold);
        Value::Object(map)
    };
    let (old_value, new_value) = (view(old), view(new));
    Ok((amended, old_value, new_value))
}
