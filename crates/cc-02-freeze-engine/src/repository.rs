//! # Batch Repository
//!
//! Typed reads of batch records and snapshot rows, plus the batch operations
//! that write them. Shared with the override ledger, which amends frozen rows
//! through the same key layout.

use crate::error::{FreezeError, FreezeResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_store::{decode, encode, BatchOperation, KVStoreError, KeyPrefix, KeyValueStore, Stored};
use shared_types::{
    AcademicBatch, BatchId, BatchPromotionRule, BatchRegulationTerms, BatchSemester,
    BatchSnapshot, BatchSubject,
};
use std::fmt::Display;

/// Typed access to batches and their snapshot rows.
#[derive(Debug, Clone)]
pub struct BatchRepository<KV: KeyValueStore> {
    store: KV,
}

impl<KV: KeyValueStore> BatchRepository<KV> {
    pub fn new(store: KV) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &KV {
        &self.store
    }

    /// Load a batch, keeping the raw record for conditional writes.
    pub fn load(&self, id: BatchId) -> FreezeResult<Stored<AcademicBatch>> {
        let raw = self
            .store
            .get(&KeyPrefix::Batch.key(id))?
            .ok_or(FreezeError::BatchNotFound { id })?;
        Ok(Stored::decode(raw)?)
    }

    pub fn find_id_by_code(&self, code: &str) -> FreezeResult<Option<BatchId>> {
        match self.store.get(&KeyPrefix::BatchCode.key(code))? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Every batch, ordered by code.
    pub fn list(&self) -> FreezeResult<Vec<AcademicBatch>> {
        let mut batches = self
            .store
            .prefix_scan(KeyPrefix::Batch.as_bytes())?
            .into_iter()
            .map(|(_, raw)| decode::<AcademicBatch>(&raw))
            .collect::<Result<Vec<_>, _>>()?;
        batches.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(batches)
    }

    pub fn terms(&self, id: BatchId) -> FreezeResult<Option<BatchRegulationTerms>> {
        match self.store.get(&KeyPrefix::BatchTerms.key(id))? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn semesters(&self, id: BatchId) -> FreezeResult<Vec<BatchSemester>> {
        let mut rows: Vec<BatchSemester> = self.rows(KeyPrefix::BatchSemester, id)?;
        rows.sort_by_key(|s| s.semester_number);
        Ok(rows)
    }

    pub fn subjects(&self, id: BatchId) -> FreezeResult<Vec<BatchSubject>> {
        let mut rows: Vec<BatchSubject> = self.rows(KeyPrefix::BatchSubject, id)?;
        rows.sort_by(|a, b| (a.semester_number, &a.code).cmp(&(b.semester_number, &b.code)));
        Ok(rows)
    }

    pub fn promotion_rules(&self, id: BatchId) -> FreezeResult<Vec<BatchPromotionRule>> {
        let mut rows: Vec<BatchPromotionRule> = self.rows(KeyPrefix::BatchPromotionRule, id)?;
        rows.sort_by_key(|r| (r.from_year, r.to_year, r.rule_type));
        Ok(rows)
    }

    /// Load one snapshot row with its raw bytes.
    pub fn row<T: DeserializeOwned>(
        &self,
        prefix: KeyPrefix,
        id: BatchId,
        row_id: impl Display,
    ) -> FreezeResult<Option<Stored<T>>> {
        match self.store.get(&prefix.child_key(id, row_id))? {
            Some(raw) => Ok(Some(Stored::decode(raw)?)),
            None => Ok(None),
        }
    }

    /// The frozen batch and all of its snapshot rows.
    ///
    /// ## Errors
    ///
    /// - `BatchNotFound`: No batch with this id
    /// - `BatchNotFrozen`: The batch has no snapshot yet
    pub fn load_snapshot(&self, id: BatchId) -> FreezeResult<BatchSnapshot> {
        let batch = self.load(id)?.into_inner();
        if !batch.is_frozen() {
            return Err(FreezeError::BatchNotFrozen { id });
        }
        let terms = self.terms(id)?.ok_or_else(|| KVStoreError::CorruptionError {
            message: format!("frozen batch {} has no regulation terms", id),
        })?;
        Ok(BatchSnapshot {
            batch,
            terms,
            semesters: self.semesters(id)?,
            subjects: self.subjects(id)?,
            promotion_rules: self.promotion_rules(id)?,
        })
    }

    /// Deletes for the batch record, its code and every snapshot row.
    /// Override ledger entries are not touched.
    pub fn delete_operations(&self, batch: &AcademicBatch) -> FreezeResult<Vec<BatchOperation>> {
        let mut operations = vec![
            BatchOperation::delete(KeyPrefix::Batch.key(batch.id)),
            BatchOperation::delete(KeyPrefix::BatchCode.key(&batch.code)),
            BatchOperation::delete(KeyPrefix::BatchTerms.key(batch.id)),
        ];
        for prefix in [
            KeyPrefix::BatchSemester,
            KeyPrefix::BatchSubject,
            KeyPrefix::BatchPromotionRule,
        ] {
            for (key, _) in self.store.prefix_scan(&prefix.owner_prefix(batch.id))? {
                operations.push(BatchOperation::delete(key));
            }
        }
        Ok(operations)
    }

    fn rows<T: DeserializeOwned>(&self, prefix: KeyPrefix, id: BatchId) -> FreezeResult<Vec<T>> {
        self.store
            .prefix_scan(&prefix.owner_prefix(id))?
            .into_iter()
            .map(|(_, raw)| decode::<T>(&raw).map_err(FreezeError::from))
            .collect()
    }
}

/// Precondition that the batch record still holds the bytes it was read from.
pub fn guard(stored: &Stored<AcademicBatch>) -> BatchOperation {
    BatchOperation::expect_value(KeyPrefix::Batch.key(stored.value.id), stored.raw.clone())
}

pub fn put_batch(batch: &AcademicBatch) -> FreezeResult<BatchOperation> {
    Ok(BatchOperation::put(KeyPrefix::Batch.key(batch.id), encode(batch)?))
}

pub fn put_row<T: Serialize>(
    prefix: KeyPrefix,
    id: BatchId,
    row_id: impl Display,
    row: &T,
) -> FreezeResult<BatchOperation> {
    Ok(BatchOperation::put(prefix.child_key(id, row_id), encode(row)?))
}

/// Puts for the stamped batch record, its terms and every snapshot row.
pub fn snapshot_operations(snapshot: &BatchSnapshot) -> FreezeResult<Vec<BatchOperation>> {
    let id = snapshot.batch.id;
    let mut operations = vec![
        put_batch(&snapshot.batch)?,
        BatchOperation::put(KeyPrefix::BatchTerms.key(id), encode(&snapshot.terms)?),
    ];
    for semester in &snapshot.semesters {
        operations.push(put_row(KeyPrefix::BatchSemester, id, semester.id, semester)?);
    }
    for subject in &snapshot.subjects {
        operations.push(put_row(KeyPrefix::BatchSubject, id, subject.id, subject)?);
    }
    for rule in &snapshot.promotion_rules {
        operations.push(put_row(KeyPrefix::BatchPromotionRule, id, rule.id, rule)?);
    }
    Ok(operations)
}
