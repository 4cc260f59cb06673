//! # Promotion Flow
//!
//! Eligibility judged from frozen batch rows, end to end.

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use cc_01_rule_store::{PromotionRuleUpdate, RuleStoreApi};
    use cc_02_freeze_engine::FreezeEngineApi;
    use cc_03_promotion::{PromotionApi, PromotionError};
    use cc_04_override_ledger::{AmendmentRequest, Approval, OverrideLedgerApi, RuleAmendment};
    use shared_store::InMemoryKVStore;
    use std::sync::Arc;

    fn harness() -> Harness<Arc<InMemoryKVStore>> {
        Harness::new(Arc::new(InMemoryKVStore::new()))
    }

    #[test]
    fn test_student_below_credit_percentage_is_held_back() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);
        let student = h.enrol(&batch, &[(1, 25.0, &[]), (2, 20.0, &[])]);

        let result = h.evaluator.evaluate(student, 2, true).unwrap();

        assert!(!result.eligible);
        assert!(result.dry_run);
        assert_eq!(result.earned_credits, 45.0);
        assert_eq!(result.required_credits, 100.0);
        assert_eq!(result.credit_percentage, Some(45.0));
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0].contains("45.00%"));
        assert!(result.violations[0].contains("50.00%"));
    }

    #[test]
    fn test_student_at_threshold_is_promoted() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);
        let student = h.enrol(&batch, &[(1, 30.0, &["MA101"]), (2, 20.0, &[])]);

        let result = h.evaluator.evaluate(student, 2, true).unwrap();
        assert!(result.eligible, "violations: {:?}", result.violations);
        assert_eq!(result.backlog_count, 1);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_each_batch_judged_by_its_own_regulation() {
        let h = harness();
        let strict = h.seed_regulation("R2024");
        let lenient = h.seed_regulation("R2025");
        let rule = h.rules.load_rule_set(lenient.id).unwrap().promotion_rules[0].clone();
        h.rules
            .update_promotion_rule(lenient.id, lenient.version, rule.id, PromotionRuleUpdate {
                min_credit_percentage_required: Some(40.0),
                ..Default::default()
            })
            .unwrap();

        let old_batch = h.frozen_batch("CSE-2024", &strict);
        let new_batch = h.frozen_batch("CSE-2025", &lenient);
        let results = [(1, 25.0, &[][..]), (2, 20.0, &[][..])];
        let old_student = h.enrol(&old_batch, &results);
        let new_student = h.enrol(&new_batch, &results);

        assert!(!h.evaluator.evaluate(old_student, 2, true).unwrap().eligible);
        assert!(h.evaluator.evaluate(new_student, 2, true).unwrap().eligible);
    }

    #[test]
    fn test_recorded_amendment_changes_the_verdict() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);
        let student = h.enrol(&batch, &[(1, 25.0, &[]), (2, 20.0, &[])]);
        assert!(!h.evaluator.evaluate(student, 2, true).unwrap().eligible);

        let rule_id = h.freeze.load_snapshot(batch.id).unwrap().promotion_rules[0].id;
        h.ledger
            .apply_override(AmendmentRequest {
                batch_id: batch.id,
                amendment: RuleAmendment::PromotionThreshold {
                    rule_id,
                    threshold: 45.0,
                },
                approval: Approval {
                    reason: "Academic council resolution 14/2025".into(),
                    approved_by_id: h.approver,
                    document_ref: Some("AC-14-2025".into()),
                },
            })
            .unwrap();

        let result = h.evaluator.evaluate(student, 2, true).unwrap();
        assert!(result.eligible);
        assert_eq!(result.outcomes[0].threshold, 45.0);
    }

    #[test]
    fn test_unfrozen_batch_cannot_be_evaluated() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.freeze.register_batch(h.new_batch("CSE-2024", &reg)).unwrap();
        let student = h.enrol(&batch, &[(1, 50.0, &[]), (2, 50.0, &[])]);

        let err = h.evaluator.evaluate(student, 2, true).unwrap_err();
        assert_eq!(err, PromotionError::BatchNotFrozen { id: batch.id });
    }

    #[test]
    fn test_no_rule_for_later_years() {
        let h = harness();
        let reg = h.seed_regulation("R2024");
        let batch = h.frozen_batch("CSE-2024", &reg);
        let student = h.enrol(&batch, &[(3, 50.0, &[]), (4, 50.0, &[])]);

        let err = h.evaluator.evaluate(student, 3, true).unwrap_err();
        assert!(matches!(err, PromotionError::PromotionRuleNotFound { .. }));
    }
}
