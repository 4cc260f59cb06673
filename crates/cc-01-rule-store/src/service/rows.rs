//! # Child Row Edits
//!
//! Semesters, subjects and promotion rules. Each edit goes through
//! `RuleStoreService::edit`, so it is version checked and bumps the
//! regulation version.

use super::*;
use crate::repository::{delete_row, put_row};

impl<KV: KeyValueStore, TS: TimeSource> RuleStoreService<KV, TS> {
    pub(crate) fn add_semester_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewSemester,
    ) -> RuleStoreResult<RegulationSemester> {
        let existing = self.repo.semesters(id)?;
        let (_, semester) = self.edit(id, expected_version, |regulation, ops| {
            let semester = new.into_semester(regulation);
            validation::validate_semester(regulation, &semester)?;
            if existing
                .iter()
                .any(|s| s.semester_number == semester.semester_number)
            {
                return Err(RuleStoreError::DuplicateRow {
                    kind: "semester",
                    key: semester.semester_number.to_string(),
                });
            }
            ops.push(put_row(
                KeyPrefix::RegulationSemester,
                id,
                semester.id,
                &semester,
            )?);
            Ok(semester)
        })?;
        Ok(semester)
    }

    pub(crate) fn update_semester_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        semester_id: SemesterId,
        update: SemesterUpdate,
    ) -> RuleStoreResult<RegulationSemester> {
        let mut semester: RegulationSemester = self
            .repo
            .row(KeyPrefix::RegulationSemester, id, semester_id)?
            .ok_or(RuleStoreError::RowNotFound {
                kind: "semester",
                id: semester_id.0,
            })?;

        let (_, semester) = self.edit(id, expected_version, |regulation, ops| {
            update.apply_to(&mut semester);
            validation::validate_semester(regulation, &semester)?;
            ops.push(put_row(
                KeyPrefix::RegulationSemester,
                id,
                semester.id,
                &semester,
            )?);
            Ok(semester)
        })?;
        Ok(semester)
    }

    /// Removing a semester removes the subjects taught in it.
    pub(crate) fn remove_semester_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        semester_id: SemesterId,
    ) -> RuleStoreResult<()> {
        let semester: RegulationSemester = self
            .repo
            .row(KeyPrefix::RegulationSemester, id, semester_id)?
            .ok_or(RuleStoreError::RowNotFound {
                kind: "semester",
                id: semester_id.0,
            })?;
        let subjects = self.repo.subjects(id)?;

        let (_, removed) = self.edit(id, expected_version, |_, ops| {
            ops.push(delete_row(KeyPrefix::RegulationSemester, id, semester.id));
            let mut removed = 0usize;
            for subject in subjects
                .iter()
                .filter(|s| s.semester_number == semester.semester_number)
            {
                ops.push(delete_row(KeyPrefix::RegulationSubject, id, subject.id));
                removed += 1;
            }
            Ok(removed)
        })?;
        debug!(
            regulation = %id,
            semester = semester.semester_number,
            subjects_removed = removed,
            "semester removed"
        );
        Ok(())
    }

    pub(crate) fn add_subject_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewSubject,
    ) -> RuleStoreResult<RegulationSubject> {
        let semesters = self.repo.semesters(id)?;
        let subjects = self.repo.subjects(id)?;

        let (_, subject) = self.edit(id, expected_version, |regulation, ops| {
            let subject = new.into_subject(id);
            validation::validate_subject(regulation, &subject)?;
            if !semesters
                .iter()
                .any(|s| s.semester_number == subject.semester_number)
            {
                return Err(ValidationError::new(
                    "semester_number",
                    format!("semester {} does not exist", subject.semester_number),
                )
                .into());
            }
            if subjects.iter().any(|s| s.code == subject.code) {
                return Err(RuleStoreError::DuplicateRow {
                    kind: "subject",
                    key: subject.code,
                });
            }
            ops.push(put_row(KeyPrefix::RegulationSubject, id, subject.id, &subject)?);
            Ok(subject)
        })?;
        Ok(subject)
    }

    pub(crate) fn update_subject_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        subject_id: SubjectId,
        update: SubjectUpdate,
    ) -> RuleStoreResult<RegulationSubject> {
        let mut subject: RegulationSubject = self
            .repo
            .row(KeyPrefix::RegulationSubject, id, subject_id)?
            .ok_or(RuleStoreError::RowNotFound {
                kind: "subject",
                id: subject_id.0,
            })?;

        let (_, subject) = self.edit(id, expected_version, |regulation, ops| {
            update.apply_to(&mut subject);
            validation::validate_subject(regulation, &subject)?;
            ops.push(put_row(KeyPrefix::RegulationSubject, id, subject.id, &subject)?);
            Ok(subject)
        })?;
        Ok(subject)
    }

    pub(crate) fn remove_subject_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        subject_id: SubjectId,
    ) -> RuleStoreResult<()> {
        if self
            .repo
            .row::<RegulationSubject>(KeyPrefix::RegulationSubject, id, subject_id)?
            .is_none()
        {
            return Err(RuleStoreError::RowNotFound {
                kind: "subject",
                id: subject_id.0,
            });
        }
        self.edit(id, expected_version, |_, ops| {
            ops.push(delete_row(KeyPrefix::RegulationSubject, id, subject_id));
            Ok(())
        })?;
        Ok(())
    }

    pub(crate) fn add_rule_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewPromotionRule,
    ) -> RuleStoreResult<RegulationPromotionRule> {
        let rules = self.repo.promotion_rules(id)?;

        let (_, rule) = self.edit(id, expected_version, |regulation, ops| {
            let rule = new.into_rule(id);
            validation::validate_promotion_rule(regulation, &rule)?;
            if rules.iter().any(|r| {
                (r.from_year, r.to_year, r.rule_type) == (rule.from_year, rule.to_year, rule.rule_type)
            }) {
                return Err(RuleStoreError::DuplicateRow {
                    kind: "promotion rule",
                    key: format!("{}->{} {}", rule.from_year, rule.to_year, rule.rule_type),
                });
            }
            ops.push(put_row(
                KeyPrefix::RegulationPromotionRule,
                id,
                rule.id,
                &rule,
            )?);
            Ok(rule)
        })?;
        Ok(rule)
    }

    pub(crate) fn update_rule_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        rule_id: PromotionRuleId,
        update: PromotionRuleUpdate,
    ) -> RuleStoreResult<RegulationPromotionRule> {
        let mut rule: RegulationPromotionRule = self
            .repo
            .row(KeyPrefix::RegulationPromotionRule, id, rule_id)?
            .ok_or(RuleStoreError::RowNotFound {
                kind: "promotion rule",
                id: rule_id.0,
            })?;

        let (_, rule) = self.edit(id, expected_version, |regulation, ops| {
            update.apply_to(&mut rule);
            validation::validate_promotion_rule(regulation, &rule)?;
            ops.push(put_row(
                KeyPrefix::RegulationPromotionRule,
                id,
                rule.id,
                &rule,
            )?);
            Ok(rule)
        })?;
        Ok(rule)
    }

    pub(crate) fn remove_rule_row(
        &self,
        id: RegulationId,
        expected_version: u64,
        rule_id: PromotionRuleId,
    ) -> RuleStoreResult<()> {
        if self
            .repo
            .row::<RegulationPromotionRule>(KeyPrefix::RegulationPromotionRule, id, rule_id)?
            .is_none()
        {
            return Err(RuleStoreError::RowNotFound {
                kind: "promotion rule",
                id: rule_id.0,
            });
        }
        self.edit(id, expected_version, |_, ops| {
            ops.push(delete_row(KeyPrefix::RegulationPromotionRule, id, rule_id));
            Ok(())
        })?;
        Ok(())
    }
}
