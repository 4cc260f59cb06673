//! # Ledger Repository
//!
//! Entries live under `ovr:{batch}:{sequence}` with a zero-padded sequence, so
//! one prefix scan returns a batch's ledger in order. Nothing here deletes.

use crate::error::LedgerResult;
use shared_store::{decode, encode, BatchOperation, KeyPrefix, KeyValueStore};
use shared_types::{BatchId, BatchRuleOverride};

#[derive(Debug, Clone)]
pub struct OverrideRepository<KV: KeyValueStore> {
    store: KV,
}

impl<KV: KeyValueStore> OverrideRepository<KV> {
    pub fn new(store: KV) -> Self {
        Self { store }
    }

    /// Entries for a batch, ordered by sequence.
    pub fn list(&self, batch_id: BatchId) -> LedgerResult<Vec<BatchRuleOverride>> {
        let mut entries = self
            .store
            .prefix_scan(&KeyPrefix::Override.owner_prefix(batch_id))?
            .into_iter()
            .map(|(_, raw)| decode::<BatchRuleOverride>(&raw))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.sequence);
        Ok(entries)
    }

    /// Sequence the next entry for `batch_id` should claim.
    pub fn next_sequence(&self, batch_id: BatchId) -> LedgerResult<u64> {
        Ok(self
            .list(batch_id)?
            .last()
            .map_or(1, |last| last.sequence + 1))
    }
}

/// Claim the entry's slot and write it.
pub fn append_operations(entry: &BatchRuleOverride) -> LedgerResult<Vec<BatchOperation>> {
    let key = KeyPrefix::override_key(entry.batch_id, entry.sequence);
    Ok(vec![
        BatchOperation::expect_absent(key.clone()),
        BatchOperation::put(key, encode(entry)?),
    ])
}
