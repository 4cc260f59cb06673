//! # Regulation Repository
//!
//! Typed reads over the shared key-value store plus the batch operations the
//! Rule Store and the Freeze Engine write through. Nothing here commits; the
//! caller assembles one batch and writes it once.

use crate::error::{RuleStoreError, RuleStoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_store::{decode, encode, BatchOperation, KeyPrefix, KeyValueStore, Stored};
use shared_types::{
    Regulation, RegulationId, RegulationPromotionRule, RegulationRuleSet, RegulationSemester,
    RegulationSubject, Timestamp, UserId,
};
use std::fmt::Display;

/// A rule set together with the raw regulation record it was read from.
///
/// `regulation_raw` is what a later write expects to still find in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRuleSet {
    pub rule_set: RegulationRuleSet,
    pub regulation_raw: Vec<u8>,
}

impl StoredRuleSet {
    /// Precondition that the regulation record is unchanged since the read.
    pub fn guard(&self) -> BatchOperation {
        BatchOperation::expect_value(
            KeyPrefix::Regulation.key(self.rule_set.regulation.id),
            self.regulation_raw.clone(),
        )
    }
}

/// Typed access to regulations and their child rows.
#[derive(Debug, Clone)]
pub struct RegulationRepository<KV: KeyValueStore> {
    store: KV,
}

impl<KV: KeyValueStore> RegulationRepository<KV> {
    pub fn new(store: KV) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &KV {
        &self.store
    }

    /// Load a regulation, keeping the raw record for conditional writes.
    pub fn load(&self, id: RegulationId) -> RuleStoreResult<Stored<Regulation>> {
        let raw = self
            .store
            .get(&KeyPrefix::Regulation.key(id))?
            .ok_or(RuleStoreError::RegulationNotFound { id })?;
        Ok(Stored::decode(raw)?)
    }

    pub fn find_id_by_code(&self, code: &str) -> RuleStoreResult<Option<RegulationId>> {
        match self.store.get(&KeyPrefix::RegulationCode.key(code))? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Every regulation, ordered by code.
    pub fn list(&self) -> RuleStoreResult<Vec<Regulation>> {
        let mut regulations = self
            .store
            .prefix_scan(KeyPrefix::Regulation.as_bytes())?
            .into_iter()
            .map(|(_, raw)| decode::<Regulation>(&raw))
            .collect::<Result<Vec<_>, _>>()?;
        regulations.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(regulations)
    }

    /// Semesters ordered by number.
    pub fn semesters(&self, id: RegulationId) -> RuleStoreResult<Vec<RegulationSemester>> {
        let mut rows: Vec<RegulationSemester> = self.rows(KeyPrefix::RegulationSemester, id)?;
        rows.sort_by_key(|s| s.semester_number);
        Ok(rows)
    }

    /// Subjects ordered by semester, then code.
    pub fn subjects(&self, id: RegulationId) -> RuleStoreResult<Vec<RegulationSubject>> {
        let mut rows: Vec<RegulationSubject> = self.rows(KeyPrefix::RegulationSubject, id)?;
        rows.sort_by(|a, b| {
            (a.semester_number, &a.code).cmp(&(b.semester_number, &b.code))
        });
        Ok(rows)
    }

    /// Promotion rules ordered by transition, then type.
    pub fn promotion_rules(
        &self,
        id: RegulationId,
    ) -> RuleStoreResult<Vec<RegulationPromotionRule>> {
        let mut rows: Vec<RegulationPromotionRule> =
            self.rows(KeyPrefix::RegulationPromotionRule, id)?;
        rows.sort_by_key(|r| (r.from_year, r.to_year, r.rule_type));
        Ok(rows)
    }

    /// Load one child row by id.
    pub fn row<T: DeserializeOwned>(
        &self,
        prefix: KeyPrefix,
        id: RegulationId,
        row_id: impl Display,
    ) -> RuleStoreResult<Option<T>> {
        match self.store.get(&prefix.child_key(id, row_id))? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Regulation and all child rows, read from one regulation version.
    pub fn load_rule_set(&self, id: RegulationId) -> RuleStoreResult<StoredRuleSet> {
        let stored = self.load(id)?;
        let semesters = self.semesters(id)?;
        let subjects = self.subjects(id)?;
        let promotion_rules = self.promotion_rules(id)?;
        Ok(StoredRuleSet {
            rule_set: RegulationRuleSet {
                regulation: stored.value,
                semesters,
                subjects,
                promotion_rules,
            },
            regulation_raw: stored.raw,
        })
    }

    /// Operations that lock `stored` on behalf of `actor`.
    ///
    /// The returned batch is conditional on the record being unchanged and
    /// bumps the version. Returns the regulation as it will be stored.
    pub fn lock_operations(
        &self,
        stored: &Stored<Regulation>,
        actor: UserId,
        now: Timestamp,
    ) -> RuleStoreResult<(Regulation, Vec<BatchOperation>)> {
        let current = &stored.value;
        if current.is_locked {
            return Err(RuleStoreError::RegulationLocked {
                id: current.id,
                locked_at: current.locked_at,
            });
        }

        let mut locked = current.clone();
        locked.is_locked = true;
        locked.locked_at = Some(now);
        locked.locked_by = Some(actor);
        locked.version += 1;
        locked.updated_at = now;

        let operations = vec![guard(stored), put_regulation(&locked)?];
        Ok((locked, operations))
    }

    fn rows<T: DeserializeOwned>(
        &self,
        prefix: KeyPrefix,
        id: RegulationId,
    ) -> RuleStoreResult<Vec<T>> {
        self.store
            .prefix_scan(&prefix.owner_prefix(id))?
            .into_iter()
            .map(|(_, raw)| decode::<T>(&raw).map_err(RuleStoreError::from))
            .collect()
    }
}

/// Precondition that the regulation record still holds the bytes it was read from.
pub fn guard(stored: &Stored<Regulation>) -> BatchOperation {
    BatchOperation::expect_value(KeyPrefix::Regulation.key(stored.value.id), stored.raw.clone())
}

pub fn put_regulation(regulation: &Regulation) -> RuleStoreResult<BatchOperation> {
    Ok(BatchOperation::put(
        KeyPrefix::Regulation.key(regulation.id),
        encode(regulation)?,
    ))
}

pub fn put_row<T: Serialize>(
    prefix: KeyPrefix,
    id: RegulationId,
    row_id: impl Display,
    row: &T,
) -> RuleStoreResult<BatchOperation> {
    Ok(BatchOperation::put(prefix.child_key(id, row_id), encode(row)?))
}

pub fn delete_row(prefix: KeyPrefix, id: RegulationId, row_id: impl Display) -> BatchOperation {
    BatchOperation::delete(prefix.child_key(id, row_id))
}
