//! Audit report for a frozen batch.

use cc_02_freeze_engine::IntegrityReport;
use serde::{Deserialize, Serialize};
use shared_types::BatchRuleOverride;

/// Integrity of a batch's rows alongside the overrides recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub integrity: IntegrityReport,
    pub overrides: Vec<BatchRuleOverride>,
    /// The rows still match the frozen checksum, or the ledger records at
    /// least one override that may account for the difference.
    pub drift_explained: bool,
}

impl AuditReport {
    pub fn new(integrity: IntegrityReport, overrides: Vec<BatchRuleOverride>) -> Self {
        let drift_explained = integrity.matches || !overrides.is_empty();
        Self {
            integrity,
            overrides,
            drift_explained,
        }
    }
}
