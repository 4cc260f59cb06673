//! # Rule Store Service
//!
//! Implements [`RuleStoreApi`] over the shared key-value store.
//!
//! Every edit is one conditional batch: it expects the regulation record it
//! read, rewrites that record with `version + 1`, and carries the row
//! changes. Two concurrent edits based on the same version cannot both
//! commit; the loser gets `VersionConflict` (or `RegulationLocked` when the
//! winner was a lock or a freeze).

mod rows;

use crate::domain::commands::{
    NewPromotionRule, NewRegulation, NewSemester, NewSubject, PromotionRuleUpdate,
    RegulationUpdate, SemesterUpdate, SubjectUpdate,
};
use crate::domain::validation;
use crate::error::{RuleStoreError, RuleStoreResult};
use crate::ports::inbound::RuleStoreApi;
use crate::repository::{self, RegulationRepository};
use shared_store::{encode, BatchOperation, KeyPrefix, KeyValueStore, TimeSource};
use shared_types::{
    PromotionRuleId, Regulation, RegulationId, RegulationPromotionRule, RegulationRuleSet,
    RegulationSemester, RegulationSubject, SemesterId, SubjectId, UserId, ValidationError,
};
use tracing::{debug, info, warn};

/// The Rule Store service.
pub struct RuleStoreService<KV: KeyValueStore, TS: TimeSource> {
    pub(crate) repo: RegulationRepository<KV>,
    pub(crate) time_source: TS,
}

impl<KV: KeyValueStore, TS: TimeSource> RuleStoreService<KV, TS> {
    pub fn new(store: KV, time_source: TS) -> Self {
        Self {
            repo: RegulationRepository::new(store),
            time_source,
        }
    }

    pub fn repository(&self) -> &RegulationRepository<KV> {
        &self.repo
    }

    /// Run one versioned edit.
    ///
    /// `change` may modify the regulation and push row operations; the
    /// version bump, timestamp and precondition are added here. Returns the
    /// regulation as stored alongside `change`'s result.
    pub(crate) fn edit<R>(
        &self,
        id: RegulationId,
        expected_version: u64,
        change: impl FnOnce(&mut Regulation, &mut Vec<BatchOperation>) -> RuleStoreResult<R>,
    ) -> RuleStoreResult<(Regulation, R)> {
        let stored = self.repo.load(id)?;
        ensure_editable(&stored.value, expected_version)?;

        let mut regulation = stored.value.clone();
        let mut operations = vec![repository::guard(&stored)];
        let result = change(&mut regulation, &mut operations)?;

        regulation.version = stored.value.version + 1;
        regulation.updated_at = self.time_source.now();
        operations.push(repository::put_regulation(&regulation)?);

        self.commit(id, expected_version, operations)?;
        debug!(regulation = %id, version = regulation.version, "regulation edited");
        Ok((regulation, result))
    }

    /// Write a guarded batch, translating a failed guard into the domain
    /// error that explains it.
    fn commit(
        &self,
        id: RegulationId,
        expected_version: u64,
        operations: Vec<BatchOperation>,
    ) -> RuleStoreResult<()> {
        match self.repo.store().atomic_batch_write(operations) {
            Ok(()) => Ok(()),
            Err(e) if e.is_precondition_failure() => {
                let err = self.explain_conflict(id, expected_version);
                warn!(regulation = %id, error = %err, "regulation write rejected");
                Err(err)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn explain_conflict(&self, id: RegulationId, expected_version: u64) -> RuleStoreError {
        match self.repo.load(id) {
            Ok(current) if current.value.is_locked => RuleStoreError::RegulationLocked {
                id,
                locked_at: current.value.locked_at,
            },
            Ok(current) => RuleStoreError::VersionConflict {
                id,
                expected: expected_version,
                actual: current.value.version,
            },
            Err(e) => e,
        }
    }
}

fn ensure_editable(regulation: &Regulation, expected_version: u64) -> RuleStoreResult<()> {
    if regulation.is_locked {
        return Err(RuleStoreError::RegulationLocked {
            id: regulation.id,
            locked_at: regulation.locked_at,
        });
    }
    if regulation.version != expected_version {
        return Err(RuleStoreError::VersionConflict {
            id: regulation.id,
            expected: expected_version,
            actual: regulation.version,
        });
    }
    Ok(())
}

impl<KV: KeyValueStore, TS: TimeSource> RuleStoreApi for RuleStoreService<KV, TS> {
    fn create_regulation(&self, new: NewRegulation) -> RuleStoreResult<Regulation> {
        let regulation = new.into_regulation(self.time_source.now());
        validation::validate_regulation(&regulation)?;

        if self.repo.find_id_by_code(&regulation.code)?.is_some() {
            return Err(RuleStoreError::DuplicateCode {
                code: regulation.code,
            });
        }

        let code_key = KeyPrefix::RegulationCode.key(&regulation.code);
        let operations = vec![
            BatchOperation::expect_absent(code_key.clone()),
            BatchOperation::put(code_key, encode(&regulation.id)?),
            repository::put_regulation(&regulation)?,
        ];
        match self.repo.store().atomic_batch_write(operations) {
            Ok(()) => {}
            Err(e) if e.is_precondition_failure() => {
                return Err(RuleStoreError::DuplicateCode {
                    code: regulation.code,
                })
            }
            Err(e) => return Err(e.into()),
        }

        info!(regulation = %regulation.id, code = %regulation.code, "regulation created");
        Ok(regulation)
    }

    fn get_regulation(&self, id: RegulationId) -> RuleStoreResult<Regulation> {
        Ok(self.repo.load(id)?.into_inner())
    }

    fn find_regulation_by_code(&self, code: &str) -> RuleStoreResult<Regulation> {
        let id = self
            .repo
            .find_id_by_code(code.trim())?
            .ok_or_else(|| RuleStoreError::RegulationCodeNotFound {
                code: code.to_string(),
            })?;
        self.get_regulation(id)
    }

    fn list_regulations(&self) -> RuleStoreResult<Vec<Regulation>> {
        self.repo.list()
    }

    fn load_rule_set(&self, id: RegulationId) -> RuleStoreResult<RegulationRuleSet> {
        Ok(self.repo.load_rule_set(id)?.rule_set)
    }

    fn update_regulation(
        &self,
        id: RegulationId,
        expected_version: u64,
        update: RegulationUpdate,
    ) -> RuleStoreResult<Regulation> {
        let has_rows = !self.repo.semesters(id)?.is_empty()
            || !self.repo.promotion_rules(id)?.is_empty();

        let (regulation, ()) = self.edit(id, expected_version, |regulation, _| {
            if has_rows && update.changes_structure(regulation) {
                return Err(ValidationError::new(
                    "duration_years",
                    "year structure cannot change once semesters or promotion rules exist",
                )
                .into());
            }
            update.apply_to(regulation);
            validation::validate_regulation(regulation)?;
            Ok(())
        })?;
        info!(regulation = %id, version = regulation.version, "regulation updated");
        Ok(regulation)
    }

    fn delete_regulation(&self, id: RegulationId, expected_version: u64) -> RuleStoreResult<()> {
        let stored = self.repo.load(id)?;
        ensure_editable(&stored.value, expected_version)?;

        let mut operations = vec![
            repository::guard(&stored),
            BatchOperation::delete(KeyPrefix::Regulation.key(id)),
            BatchOperation::delete(KeyPrefix::RegulationCode.key(&stored.value.code)),
        ];
        for prefix in [
            KeyPrefix::RegulationSemester,
            KeyPrefix::RegulationSubject,
            KeyPrefix::RegulationPromotionRule,
        ] {
            for (key, _) in self.repo.store().prefix_scan(&prefix.owner_prefix(id))? {
                operations.push(BatchOperation::delete(key));
            }
        }

        self.commit(id, expected_version, operations)?;
        info!(regulation = %id, code = %stored.value.code, "regulation deleted");
        Ok(())
    }

    fn lock_regulation(&self, id: RegulationId, actor: UserId) -> RuleStoreResult<Regulation> {
        let stored = self.repo.load(id)?;
        let (locked, operations) =
            self.repo
                .lock_operations(&stored, actor, self.time_source.now())?;

        self.commit(id, stored.value.version, operations)?;
        info!(
            regulation = %id,
            code = %locked.code,
            actor = %actor,
            "regulation locked"
        );
        Ok(locked)
    }

    fn add_semester(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewSemester,
    ) -> RuleStoreResult<RegulationSemester> {
        self.add_semester_row(id, expected_version, new)
    }

    fn update_semester(
        &self,
        id: RegulationId,
        expected_version: u64,
        semester_id: SemesterId,
        update: SemesterUpdate,
    ) -> RuleStoreResult<RegulationSemester> {
        self.update_semester_row(id, expected_version, semester_id, update)
    }

    fn remove_semester(
        &self,
        id: RegulationId,
        expected_version: u64,
        semester_id: SemesterId,
    ) -> RuleStoreResult<()> {
        self.remove_semester_row(id, expected_version, semester_id)
    }

    fn add_subject(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewSubject,
    ) -> RuleStoreResult<RegulationSubject> {
        self.add_subject_row(id, expected_version, new)
    }

    fn update_subject(
        &self,
        id: RegulationId,
        expected_version: u64,
        subject_id: SubjectId,
        update: SubjectUpdate,
    ) -> RuleStoreResult<RegulationSubject> {
        self.update_subject_row(id, expected_version, subject_id, update)
    }

    fn remove_subject(
        &self,
        id: RegulationId,
        expected_version: u64,
        subject_id: SubjectId,
    ) -> RuleStoreResult<()> {
        self.remove_subject_row(id, expected_version, subject_id)
    }

    fn add_promotion_rule(
        &self,
        id: RegulationId,
        expected_version: u64,
        new: NewPromotionRule,
    ) -> RuleStoreResult<RegulationPromotionRule> {
        self.add_rule_row(id, expected_version, new)
    }

    fn update_promotion_rule(
        &self,
        id: RegulationId,
        expected_version: u64,
        rule_id: PromotionRuleId,
        update: PromotionRuleUpdate,
    ) -> RuleStoreResult<RegulationPromotionRule> {
        self.update_rule_row(id, expected_version, rule_id, update)
    }

    fn remove_promotion_rule(
        &self,
        id: RegulationId,
        expected_version: u64,
        rule_id: PromotionRuleId,
    ) -> RuleStoreResult<()> {
        self.remove_rule_row(id, expected_version, rule_id)
    }
}
