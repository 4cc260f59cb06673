//! # Checksum Properties
//!
//! The freeze checksum is the tamper anchor of a batch: it must be stable
//! under row reordering, sensitive to every rule field, and always rendered
//! as 64 lowercase hex characters.

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use cc_01_rule_store::RuleStoreApi;
    use cc_02_freeze_engine::{checksum_rule_set, checksum_snapshot, is_well_formed, FreezeEngineApi};
    use rand::seq::SliceRandom;
    use rand::thread_rng;
    use shared_store::InMemoryKVStore;
    use shared_types::{MarksScheme, PromotionRuleType, RegulationRuleSet, SubjectType};
    use std::sync::Arc;

    fn rule_set() -> RegulationRuleSet {
        let h = Harness::new(Arc::new(InMemoryKVStore::new()));
        let reg = h.seed_regulation("R2024");
        h.rules.load_rule_set(reg.id).unwrap()
    }

    #[test]
    fn test_checksum_is_deterministic_under_shuffle() {
        let original = rule_set();
        let expected = checksum_rule_set(&original);
        assert_eq!(checksum_rule_set(&original), expected);

        let mut rng = thread_rng();
        for _ in 0..20 {
            let mut shuffled = original.clone();
            shuffled.semesters.shuffle(&mut rng);
            shuffled.subjects.shuffle(&mut rng);
            shuffled.promotion_rules.shuffle(&mut rng);
            assert_eq!(checksum_rule_set(&shuffled), expected);
        }
    }

    #[test]
    fn test_every_rule_field_is_covered() {
        let original = rule_set();
        let baseline = checksum_rule_set(&original);

        let edits: Vec<(&str, Box<dyn Fn(&mut RegulationRuleSet)>)> = vec![
            ("code", Box::new(|s| s.regulation.code.push('X'))),
            ("name", Box::new(|s| s.regulation.name.push('X'))),
            ("total_credits", Box::new(|s| s.regulation.total_credits += 0.5)),
            ("min_pass", Box::new(|s| s.regulation.min_pass_percentage += 1.0)),
            ("attendance", Box::new(|s| s.regulation.min_attendance_percentage -= 1.0)),
            ("semester credits", Box::new(|s| s.semesters[0].total_credits += 1.0)),
            ("semester minimum", Box::new(|s| s.semesters[1].min_credits_required += 1.0)),
            ("subject credits", Box::new(|s| s.subjects[0].credits = 3.0)),
            ("subject code", Box::new(|s| s.subjects[1].code = "MA199".into())),
            ("subject type", Box::new(|s| s.subjects[2].subject_type = SubjectType::Practical)),
            (
                "subject marks",
                Box::new(|s| {
                    s.subjects[0].marks = MarksScheme {
                        internal_max_marks: 50,
                        ..s.subjects[0].marks
                    }
                }),
            ),
            (
                "rule threshold",
                Box::new(|s| s.promotion_rules[0].min_credit_percentage_required = Some(45.0)),
            ),
            (
                "rule type",
                Box::new(|s| s.promotion_rules[0].rule_type = PromotionRuleType::CreditCount),
            ),
        ];

        for (field, edit) in edits {
            let mut edited = original.clone();
            edit(&mut edited);
            assert_ne!(checksum_rule_set(&edited), baseline, "{} not covered", field);
        }
    }

    #[test]
    fn test_checksum_format() {
        let full = rule_set();
        let mut empty = full.clone();
        empty.semesters.clear();
        empty.subjects.clear();
        empty.promotion_rules.clear();

        for set in [&full, &empty] {
            let checksum = checksum_rule_set(set);
            assert_eq!(checksum.len(), 64);
            assert!(is_well_formed(&checksum));
            assert!(checksum
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
        assert_ne!(checksum_rule_set(&full), checksum_rule_set(&empty));
    }

    #[test]
    fn test_snapshot_recomputes_freeze_checksum() {
        let h = Harness::new(Arc::new(InMemoryKVStore::new()));
        let reg = h.seed_regulation("R2024");
        let expected = checksum_rule_set(&h.rules.load_rule_set(reg.id).unwrap());

        let batch = h.frozen_batch("CSE-2024", &reg);
        let snapshot = h.freeze.load_snapshot(batch.id).unwrap();
        assert_eq!(batch.freeze_checksum.as_deref(), Some(expected.as_str()));
        assert_eq!(checksum_snapshot(&snapshot), expected);
    }
}
