//! Pure promotion logic over frozen batch snapshots.

pub mod eligibility;

pub use eligibility::{assess, EligibilityResult, RuleOutcome};
