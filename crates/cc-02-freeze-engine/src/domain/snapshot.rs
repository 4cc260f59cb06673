//! # Snapshot Construction
//!
//! Copies a regulation rule set into batch-scoped rows. Every batch row gets
//! a fresh id and keeps a link to the regulation row it came from; subjects
//! are re-linked to the new batch semester of the same number.

use shared_types::{
    AcademicBatch, BatchPromotionRule, BatchRegulationTerms, BatchSemester, BatchSnapshot,
    BatchSubject, RegulationRuleSet, ValidationError,
};
use std::collections::HashMap;

/// Build the snapshot rows for `batch` from `rule_set`.
///
/// Fails when a subject refers to a semester the rule set does not define.
pub fn build_snapshot(
    batch: AcademicBatch,
    rule_set: &RegulationRuleSet,
) -> Result<BatchSnapshot, ValidationError> {
    let batch_id = batch.id;

    let semesters: Vec<BatchSemester> = rule_set
        .semesters
        .iter()
        .map(|s| BatchSemester::from_regulation(batch_id, s))
        .collect();
    let by_number: HashMap<u8, _> = semesters.iter().map(|s| (s.semester_number, s.id)).collect();

    let subjects = rule_set
        .subjects
        .iter()
        .map(|subject| {
            let semester_id = by_number.get(&subject.semester_number).ok_or_else(|| {
                ValidationError::new(
                    "semester_number",
                    format!(
                        "subject {} refers to semester {} which the regulation does not define",
                        subject.code, subject.semester_number
                    ),
                )
            })?;
            Ok(BatchSubject::from_regulation(batch_id, *semester_id, subject))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    let promotion_rules = rule_set
        .promotion_rules
        .iter()
        .map(|r| BatchPromotionRule::from_regulation(batch_id, r))
        .collect();

    Ok(BatchSnapshot {
        terms: BatchRegulationTerms::from_regulation(batch_id, &rule_set.regulation),
        batch,
        semesters,
        subjects,
        promotion_rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{
        BatchId, EvaluationScheme, MarksScheme, ProgramId, Regulation, RegulationId,
        RegulationSemester, RegulationSubject, SemesterId, SubjectId, SubjectType,
    };

    fn rule_set() -> RegulationRuleSet {
        let regulation = Regulation {
            id: RegulationId::new(),
            code: "R1".into(),
            name: "R1".into(),
            program_id: ProgramId::new(),
            total_credits: 120.0,
            duration_years: 3,
            semesters_per_year: 2,
            min_pass_percentage: 40.0,
            min_attendance_percentage: 75.0,
            is_locked: false,
            locked_at: None,
            locked_by: None,
            version: 1,
            created_at: 0,
            updated_at: 0,
        };
        let semesters = vec![1u8, 2]
            .into_iter()
            .map(|n| RegulationSemester {
                id: SemesterId::new(),
                regulation_id: regulation.id,
                semester_number: n,
                academic_year: 1,
                total_credits: 20.0,
                min_credits_required: 10.0,
            })
            .collect();
        let subjects = vec![RegulationSubject {
            id: SubjectId::new(),
            regulation_id: regulation.id,
            semester_number: 2,
            code: "CS102".into(),
            name: "Data Structures".into(),
            subject_type: SubjectType::Theory,
            credits: 4.0,
            marks: MarksScheme {
                internal_max_marks: 40,
                external_max_marks: 60,
                internal_pass_marks: 16,
                external_pass_marks: 24,
                total_pass_marks: 40,
            },
            evaluation_scheme: EvaluationScheme::Absolute,
        }];
        RegulationRuleSet {
            regulation,
            semesters,
            subjects,
            promotion_rules: Vec::new(),
        }
    }

    fn batch(regulation_id: RegulationId) -> AcademicBatch {
        AcademicBatch {
            id: BatchId::new(),
            code: "B1".into(),
            name: "B1".into(),
            program_id: ProgramId::new(),
            admission_year: 2024,
            regulation_id,
            regulation_code: None,
            frozen_at: None,
            frozen_by_id: None,
            freeze_checksum: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_subjects_linked_to_new_semesters() {
        let set = rule_set();
        let snapshot = build_snapshot(batch(set.regulation.id), &set).unwrap();

        let subject = &snapshot.subjects[0];
        let semester = snapshot
            .semesters
            .iter()
            .find(|s| s.id == subject.batch_semester_id)
            .unwrap();
        assert_eq!(semester.semester_number, 2);
        assert_eq!(subject.source_subject_id, set.subjects[0].id);
        assert_eq!(semester.source_semester_id, set.semesters[1].id);
        assert_eq!(snapshot.terms.code, "R1");
    }

    #[test]
    fn test_orphan_subject_rejected() {
        let mut set = rule_set();
        set.subjects[0].semester_number = 5;
        let err = build_snapshot(batch(set.regulation.id), &set).unwrap_err();
        assert_eq!(err.field, "semester_number");
    }
}
