//! Regulation import files.
//!
//! An import creates the regulation and then adds each child row, one
//! versioned edit at a time. A failure part way leaves an unlocked, partially
//! populated regulation that can be fixed up or deleted.

use cc_01_rule_store::{
    NewPromotionRule, NewRegulation, NewSemester, NewSubject, RuleStoreApi, RuleStoreResult,
};
use serde::{Deserialize, Serialize};
use shared_types::RegulationRuleSet;

/// A regulation with all of its rows, as read from an import file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationImport {
    pub regulation: NewRegulation,
    #[serde(default)]
    pub semesters: Vec<NewSemester>,
    #[serde(default)]
    pub subjects: Vec<NewSubject>,
    #[serde(default)]
    pub promotion_rules: Vec<NewPromotionRule>,
}

pub fn import_regulation<R: RuleStoreApi>(
    rules: &R,
    import: RegulationImport,
) -> RuleStoreResult<RegulationRuleSet> {
    let regulation = rules.create_regulation(import.regulation)?;
    let id = regulation.id;
    let mut version = regulation.version;

    for semester in import.semesters {
        rules.add_semester(id, version, semester)?;
        version += 1;
    }
    for subject in import.subjects {
        rules.add_subject(id, version, subject)?;
        version += 1;
    }
    for rule in import.promotion_rules {
        rules.add_promotion_rule(id, version, rule)?;
        version += 1;
    }
    rules.load_rule_set(id)
}
