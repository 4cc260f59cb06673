//! # Persistence
//!
//! Frozen batches and the ledger across a restart of the file-backed store.

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use cc_01_rule_store::RuleStoreApi;
    use cc_02_freeze_engine::FreezeEngineApi;
    use cc_03_promotion::PromotionApi;
    use cc_04_override_ledger::{Approval, NewOverride, OverrideLedgerApi};
    use serde_json::json;
    use shared_store::{FileBackedKVStore, KVStoreError};
    use shared_types::OverrideRuleType;
    use std::sync::Arc;

    fn open(path: &std::path::Path) -> Harness<Arc<FileBackedKVStore>> {
        Harness::new(Arc::new(FileBackedKVStore::open(path).unwrap()))
    }

    #[test]
    fn test_frozen_batch_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.db");

        let (batch, snapshot, entry) = {
            let h = open(&path);
            let reg = h.seed_regulation("R2024");
            let batch = h.frozen_batch("CSE-2024", &reg);
            let entry = h
                .ledger
                .record_override(NewOverride {
                    batch_id: batch.id,
                    rule_type: OverrideRuleType::PromotionRule,
                    rule_id: None,
                    old_value: json!(50.0),
                    new_value: json!(45.0),
                    approval: Approval {
                        reason: "Approved by the board of studies".into(),
                        approved_by_id: h.approver,
                        document_ref: None,
                    },
                })
                .unwrap();
            let snapshot = h.freeze.load_snapshot(batch.id).unwrap();
            (batch, snapshot, entry)
        };

        let h = open(&path);
        assert_eq!(h.freeze.find_batch_by_code("CSE-2024").unwrap(), batch);
        assert_eq!(h.freeze.load_snapshot(batch.id).unwrap(), snapshot);
        assert!(h.freeze.verify_integrity(batch.id).unwrap().matches);
        assert_eq!(h.ledger.list_overrides(batch.id).unwrap(), vec![entry]);
        assert!(h.rules.find_regulation_by_code("R2024").unwrap().is_locked);

        let student = h.enrol(&batch, &[(1, 25.0, &[]), (2, 20.0, &[])]);
        assert!(!h.evaluator.evaluate(student, 2, true).unwrap().eligible);
    }

    #[test]
    fn test_second_open_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.db");

        let first = FileBackedKVStore::open(&path).unwrap();
        match FileBackedKVStore::open(&path) {
            Err(KVStoreError::Locked { .. }) => {}
            Err(other) => panic!("expected a lock error, got {}", other),
            Ok(_) => panic!("store opened twice"),
        }

        drop(first);
        assert!(FileBackedKVStore::open(&path).is_ok());
    }
}
