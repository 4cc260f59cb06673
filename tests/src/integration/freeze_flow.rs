//! # Freeze Flow
//!
//! Regulation → freeze → snapshot, across the rule store and freeze engine.

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use cc_01_rule_store::{
        NewSubject, PromotionRuleUpdate, RegulationUpdate, RuleStoreApi, RuleStoreError,
        SemesterUpdate,
    };
    use cc_02_freeze_engine::{FreezeEngineApi, FreezeError};
    use shared_store::{
        encode, BatchOperation, InMemoryKVStore, KVStoreError, KeyPrefix, KeyValueStore,
        ScanResult,
    };
    use shared_types::{EvaluationScheme, SubjectType, UserId};
    use std::sync::{Arc, Mutex};

    fn harness() -> Harness<Arc<InMemoryKVStore>> {
        Harness::new(Arc::new(InMemoryKVStore::new()))
    }

    #[test]
    fn test_second_freeze_leaves_first_stamps() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.freeze.register_batch(h.new_batch("CSE-2024", &reg)).unwrap();
        let first = h.freeze.freeze(batch.id, h.admin).unwrap();

        h.clock.advance(3600);
        let err = h.freeze.freeze(batch.id, UserId::new()).unwrap_err();
        assert!(matches!(err, FreezeError::BatchAlreadyFrozen { .. }));
        assert_eq!(h.freeze.get_batch(batch.id).unwrap(), first);
    }

    #[test]
    fn test_locked_regulation_rejects_every_edit() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        h.frozen_batch("CSE-2024", &reg);
        let locked = h.rules.get_regulation(reg.id).unwrap();
        assert!(locked.is_locked);

        let rule_set = h.rules.load_rule_set(reg.id).unwrap();
        let v = locked.version;
        let results = vec![
            h.rules
                .update_regulation(reg.id, v, RegulationUpdate {
                    name: Some("Renamed".into()),
                    ..Default::default()
                })
                .map(|_| ()),
            h.rules
                .update_semester(reg.id, v, rule_set.semesters[0].id, SemesterUpdate {
                    total_credits: Some(60.0),
                    ..Default::default()
                })
                .map(|_| ()),
            h.rules
                .add_subject(reg.id, v, NewSubject {
                    semester_number: 2,
                    code: "PH101".into(),
                    name: "Physics".into(),
                    subject_type: SubjectType::Theory,
                    credits: 3.0,
                    marks: crate::fixtures::marks(),
                    evaluation_scheme: EvaluationScheme::Absolute,
                })
                .map(|_| ()),
            h.rules.remove_subject(reg.id, v, rule_set.subjects[0].id),
            h.rules
                .update_promotion_rule(reg.id, v, rule_set.promotion_rules[0].id, PromotionRuleUpdate {
                    min_credit_percentage_required: Some(40.0),
                    ..Default::default()
                })
                .map(|_| ()),
            h.rules.delete_regulation(reg.id, v),
        ];
        for result in results {
            assert!(
                matches!(result, Err(RuleStoreError::RegulationLocked { .. })),
                "edit was not rejected: {:?}",
                result
            );
        }
        assert_eq!(h.rules.load_rule_set(reg.id).unwrap(), rule_set);
    }

    #[test]
    fn test_batch_rows_isolated_from_later_regulation_edits() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let first = h.frozen_batch("CSE-2024", &reg);
        let frozen_rows = h.freeze.load_snapshot(first.id).unwrap();

        // The only way to edit a locked regulation is to bypass the store's
        // edit paths entirely; even then batch rows are untouched.
        let rule_set = h.rules.load_rule_set(reg.id).unwrap();
        let mut semester = rule_set.semesters[0].clone();
        semester.total_credits = 99.0;
        h.store
            .atomic_batch_write(vec![BatchOperation::put(
                KeyPrefix::RegulationSemester.child_key(reg.id, semester.id),
                encode(&semester).unwrap(),
            )])
            .unwrap();

        assert_eq!(h.freeze.load_snapshot(first.id).unwrap(), frozen_rows);
        assert!(h.freeze.verify_integrity(first.id).unwrap().matches);

        // A batch frozen afterwards picks up the new rows and a new checksum.
        let second = h.frozen_batch("CSE-2025", &reg);
        assert_ne!(second.freeze_checksum, first.freeze_checksum);
    }

    /// Lands a competing write just before the next batch commit.
    #[derive(Default)]
    struct RacingStore {
        inner: InMemoryKVStore,
        competing: Mutex<Option<Vec<BatchOperation>>>,
    }

    impl KeyValueStore for RacingStore {
        fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
            self.inner.get(key)
        }

        fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
            self.inner.prefix_scan(prefix)
        }

        fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
            if let Some(competing) = self.competing.lock().unwrap().take() {
                self.inner.atomic_batch_write(competing)?;
            }
            self.inner.atomic_batch_write(operations)
        }
    }

    #[test]
    fn test_freeze_racing_regulation_edit_writes_nothing() {
        let store = Arc::new(RacingStore::default());
        let h = Harness::new(store.clone());
        let reg = h.seed_regulation("R2024");
        let batch = h.freeze.register_batch(h.new_batch("CSE-2024", &reg)).unwrap();
        let before = store.inner.prefix_scan(b"").unwrap();

        // Another writer renames the regulation between plan and commit.
        let mut renamed = h.rules.get_regulation(reg.id).unwrap();
        renamed.name = "Renamed".into();
        renamed.version += 1;
        let competing = vec![BatchOperation::put(
            KeyPrefix::Regulation.key(reg.id),
            encode(&renamed).unwrap(),
        )];
        *store.competing.lock().unwrap() = Some(competing);

        let err = h.freeze.freeze(batch.id, h.admin).unwrap_err();
        assert!(matches!(err, FreezeError::ConcurrentModification { .. }));

        // Only the competing write landed: no stamps, no rows, no lock.
        let after = store.inner.prefix_scan(b"").unwrap();
        let changed: Vec<_> = after.iter().filter(|entry| !before.contains(entry)).collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0, KeyPrefix::Regulation.key(reg.id));
        assert!(!h.freeze.get_batch(batch.id).unwrap().is_frozen());
        assert!(!h.rules.get_regulation(reg.id).unwrap().is_locked);

        // A retry against the new state succeeds.
        let frozen = h.freeze.freeze(batch.id, h.admin).unwrap();
        assert!(frozen.is_frozen());
    }

    #[test]
    fn test_freeze_of_missing_regulation() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let mut new = h.new_batch("CSE-2024", &reg);
        new.regulation_id = shared_types::RegulationId::new();

        let err = h.freeze.register_and_freeze(new, h.admin).unwrap_err();
        assert!(matches!(err, FreezeError::RegulationNotFound { .. }));
        assert!(h.freeze.list_batches().unwrap().is_empty());
    }
}
