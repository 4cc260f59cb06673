//! Freeze policy configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Freeze Engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeConfig {
    /// Reject freezing a regulation that defines no promotion rules.
    ///
    /// Off by default: a batch without promotion rules can still be frozen,
    /// and every promotion evaluation against it reports
    /// `PromotionRuleNotFound`.
    pub require_promotion_rules: bool,
}

impl FreezeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_require_promotion_rules(mut self, required: bool) -> Self {
        self.require_promotion_rules = required;
        self
    }
}
