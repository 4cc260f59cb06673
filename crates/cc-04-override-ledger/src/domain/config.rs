//! Override policy configuration.

use serde::{Deserialize, Serialize};

/// Default minimum length of an override reason, after trimming. Any
/// non-blank reason is accepted unless a longer minimum is configured.
pub const DEFAULT_MIN_REASON_LEN: usize = 0;

/// Configuration for the Override Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideConfig {
    /// Minimum reason length after trimming. Zero still rejects blank reasons.
    pub min_reason_len: usize,
    /// Reject overrides without a supporting document reference.
    pub require_document_ref: bool,
    /// Attempts at claiming the next ledger slot when a concurrent append
    /// takes it first.
    pub max_append_attempts: u32,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            min_reason_len: DEFAULT_MIN_REASON_LEN,
            require_document_ref: false,
            max_append_attempts: 3,
        }
    }
}

impl OverrideConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_reason_len(mut self, len: usize) -> Self {
        self.min_reason_len = len;
        self
    }

    pub fn with_require_document_ref(mut self, required: bool) -> Self {
        self.require_document_ref = required;
        self
    }

    pub fn with_max_append_attempts(mut self, attempts: u32) -> Self {
        self.max_append_attempts = attempts.max(1);
        self
    }
}
