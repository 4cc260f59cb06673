//! # Validation
//!
//! Field and cross-field checks for regulations and their child rows.
//! Row checks that need the owning regulation (semester range, year range)
//! take it as a parameter; uniqueness is checked by the service against the
//! stored rows.

use shared_types::{
    MarksScheme, PromotionRuleType, Regulation, RegulationPromotionRule, RegulationSemester,
    RegulationSubject, ValidationError,
};

type ValidationResult = Result<(), ValidationError>;

pub fn require_text(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Finite and non-negative.
pub fn require_amount(field: &'static str, value: f64) -> ValidationResult {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ValidationError::new(field, format!("must not be negative, got {}", value)));
    }
    Ok(())
}

pub fn require_percentage(field: &'static str, value: f64) -> ValidationResult {
    require_amount(field, value)?;
    if value > 100.0 {
        return Err(ValidationError::new(
            field,
            format!("must be between 0 and 100, got {}", value),
        ));
    }
    Ok(())
}

pub fn validate_regulation(regulation: &Regulation) -> ValidationResult {
    require_text("code", &regulation.code)?;
    require_text("name", &regulation.name)?;
    require_amount("total_credits", regulation.total_credits)?;
    if regulation.duration_years == 0 {
        return Err(ValidationError::new("duration_years", "must be at least 1"));
    }
    if regulation.semesters_per_year == 0 {
        return Err(ValidationError::new("semesters_per_year", "must be at least 1"));
    }
    if regulation.total_semesters() > u16::from(u8::MAX) {
        return Err(ValidationError::new(
            "duration_years",
            format!(
                "{} years of {} semesters exceeds {} semesters",
                regulation.duration_years,
                regulation.semesters_per_year,
                u8::MAX
            ),
        ));
    }
    require_percentage("min_pass_percentage", regulation.min_pass_percentage)?;
    require_percentage(
        "min_attendance_percentage",
        regulation.min_attendance_percentage,
    )?;
    Ok(())
}

pub fn validate_semester_number(regulation: &Regulation, semester_number: u8) -> ValidationResult {
    let total = regulation.total_semesters();
    if semester_number == 0 || u16::from(semester_number) > total {
        return Err(ValidationError::new(
            "semester_number",
            format!("must be between 1 and {}, got {}", total, semester_number),
        ));
    }
    Ok(())
}

pub fn validate_semester(regulation: &Regulation, semester: &RegulationSemester) -> ValidationResult {
    validate_semester_number(regulation, semester.semester_number)?;
    require_amount("total_credits", semester.total_credits)?;
    require_amount("min_credits_required", semester.min_credits_required)?;
    if semester.min_credits_required > semester.total_credits {
        return Err(ValidationError::new(
            "min_credits_required",
            format!(
                "{} exceeds the semester total of {}",
                semester.min_credits_required, semester.total_credits
            ),
        ));
    }
    Ok(())
}

pub fn validate_marks(marks: &MarksScheme) -> ValidationResult {
    if marks.internal_pass_marks > marks.internal_max_marks {
        return Err(ValidationError::new(
            "internal_pass_marks",
            "must not exceed internal_max_marks",
        ));
    }
    if marks.external_pass_marks > marks.external_max_marks {
        return Err(ValidationError::new(
            "external_pass_marks",
            "must not exceed external_max_marks",
        ));
    }
    if marks.total_pass_marks > marks.total_max_marks() {
        return Err(ValidationError::new(
            "total_pass_marks",
            "must not exceed the combined maximum",
        ));
    }
    Ok(())
}

pub fn validate_subject(regulation: &Regulation, subject: &RegulationSubject) -> ValidationResult {
    require_text("code", &subject.code)?;
    require_text("name", &subject.name)?;
    validate_semester_number(regulation, subject.semester_number)?;
    require_amount("credits", subject.credits)?;
    validate_marks(&subject.marks)
}

pub fn validate_promotion_rule(
    regulation: &Regulation,
    rule: &RegulationPromotionRule,
) -> ValidationResult {
    if rule.from_year == 0 || rule.from_year >= regulation.duration_years {
        return Err(ValidationError::new(
            "from_year",
            format!(
                "must be between 1 and {}, got {}",
                regulation.duration_years.saturating_sub(1),
                rule.from_year
            ),
        ));
    }
    if u16::from(rule.to_year) != u16::from(rule.from_year) + 1 {
        return Err(ValidationError::new(
            "to_year",
            format!("must be from_year + 1 ({}), got {}", rule.from_year + 1, rule.to_year),
        ));
    }

    if let Some(credits) = rule.min_credits_required {
        require_amount("min_credits_required", credits)?;
    }
    if let Some(pct) = rule.min_credit_percentage_required {
        require_percentage("min_credit_percentage_required", pct)?;
    }

    match rule.rule_type {
        PromotionRuleType::CreditPercentage if rule.min_credit_percentage_required.is_none() => {
            Err(ValidationError::new(
                "min_credit_percentage_required",
                "required for CREDIT_PERCENTAGE rules",
            ))
        }
        PromotionRuleType::CreditCount if rule.min_credits_required.is_none() => Err(
            ValidationError::new("min_credits_required", "required for CREDIT_COUNT rules"),
        ),
        PromotionRuleType::BacklogCount if rule.max_backlogs_allowed.is_none() => Err(
            ValidationError::new("max_backlogs_allowed", "required for BACKLOG_COUNT rules"),
        ),
        _ => Ok(()),
    }
}
