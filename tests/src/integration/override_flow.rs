//! # Override Flow
//!
//! Ledger entries against frozen batches, and the audit that pairs them
//! with checksum drift.

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use cc_02_freeze_engine::FreezeEngineApi;
    use cc_04_override_ledger::{
        AmendmentRequest, Approval, LedgerError, NewOverride, OverrideLedgerApi, RuleAmendment,
    };
    use serde_json::json;
    use shared_store::{InMemoryKVStore, KeyPrefix, KeyValueStore};
    use shared_types::{AcademicBatch, OverrideRuleType, UserId};
    use std::sync::Arc;

    const REASON: &str = "Lab capacity reduced by the university";

    fn harness() -> Harness<Arc<InMemoryKVStore>> {
        Harness::new(Arc::new(InMemoryKVStore::new()))
    }

    fn approval(by: UserId, reason: &str) -> Approval {
        Approval {
            reason: reason.into(),
            approved_by_id: by,
            document_ref: Some("UNI/2025/118".into()),
        }
    }

    fn subject_note(h: &Harness<Arc<InMemoryKVStore>>, batch: &AcademicBatch, reason: &str) -> NewOverride {
        let subject = h.freeze.load_snapshot(batch.id).unwrap().subjects[0].clone();
        NewOverride {
            batch_id: batch.id,
            rule_type: OverrideRuleType::Subject,
            rule_id: Some(subject.id.0),
            old_value: json!({ "credits": subject.credits }),
            new_value: json!({ "credits": 3.0 }),
            approval: approval(h.approver, reason),
        }
    }

    fn ledger_rows(h: &Harness<Arc<InMemoryKVStore>>, batch: &AcademicBatch) -> usize {
        h.store
            .prefix_scan(&KeyPrefix::Override.owner_prefix(batch.id))
            .unwrap()
            .len()
    }

    #[test]
    fn test_valid_override_writes_exactly_one_row() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);

        let entry = h.ledger.record_override(subject_note(&h, &batch, REASON)).unwrap();

        assert_eq!(ledger_rows(&h, &batch), 1);
        assert_eq!(entry.sequence, 1);
        assert_eq!(entry.reason, REASON);
        assert_eq!(entry.approved_by_id, h.approver);
        assert_eq!(h.ledger.list_overrides(batch.id).unwrap(), vec![entry]);
    }

    #[test]
    fn test_blank_reason_writes_nothing() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);

        for reason in ["", "   ", "\t\n"] {
            let err = h
                .ledger
                .record_override(subject_note(&h, &batch, reason))
                .unwrap_err();
            assert!(matches!(err, LedgerError::MissingReason { .. }), "{:?}", err);
        }
        assert_eq!(ledger_rows(&h, &batch), 0);
    }

    #[test]
    fn test_short_reason_writes_one_row() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);

        let entry = h
            .ledger
            .record_override(subject_note(&h, &batch, "Typo fix"))
            .unwrap();
        assert_eq!(entry.reason, "Typo fix");
        assert_eq!(ledger_rows(&h, &batch), 1);
    }

    #[test]
    fn test_non_approver_writes_nothing() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);
        let mut note = subject_note(&h, &batch, REASON);
        note.approval.approved_by_id = h.admin;

        let err = h.ledger.record_override(note).unwrap_err();
        assert_eq!(err, LedgerError::UnknownApprover { approver: h.admin });
        assert_eq!(ledger_rows(&h, &batch), 0);
    }

    #[test]
    fn test_amendments_are_explained_by_the_ledger() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);
        let snapshot = h.freeze.load_snapshot(batch.id).unwrap();

        let clean = h.ledger.audit_batch(batch.id).unwrap();
        assert!(clean.integrity.matches);
        assert!(clean.overrides.is_empty());
        assert!(clean.drift_explained);

        h.ledger
            .apply_override(AmendmentRequest {
                batch_id: batch.id,
                amendment: RuleAmendment::SemesterCredits {
                    semester_id: snapshot.semesters[0].id,
                    total_credits: None,
                    min_credits_required: Some(18.0),
                },
                approval: approval(h.approver, REASON),
            })
            .unwrap();
        h.ledger
            .apply_override(AmendmentRequest {
                batch_id: batch.id,
                amendment: RuleAmendment::SubjectCredits {
                    subject_id: snapshot.subjects[0].id,
                    credits: 3.0,
                },
                approval: approval(h.approver, REASON),
            })
            .unwrap();

        let report = h.ledger.audit_batch(batch.id).unwrap();
        assert!(!report.integrity.matches);
        assert_eq!(report.integrity.stored_checksum, clean.integrity.stored_checksum);
        assert!(report.drift_explained);
        let sequences: Vec<u64> = report.overrides.iter().map(|o| o.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);

        // The regulation's own rows are not touched by batch amendments.
        let amended = h.freeze.load_snapshot(batch.id).unwrap();
        assert_eq!(amended.semesters[0].min_credits_required, 18.0);
        let fresh = h.frozen_batch("CSE-2025", &reg);
        assert_eq!(fresh.freeze_checksum, batch.freeze_checksum);
    }

    #[test]
    fn test_ledger_outlives_its_batch() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);
        let entry = h.ledger.record_override(subject_note(&h, &batch, REASON)).unwrap();

        h.freeze.delete_batch(batch.id).unwrap();

        assert_eq!(h.ledger.list_overrides(batch.id).unwrap(), vec![entry]);
        let err = h.ledger.audit_batch(batch.id).unwrap_err();
        assert!(matches!(err, LedgerError::BatchNotFound { .. }));
    }
}
