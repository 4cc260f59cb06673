//! Override requests and their admission checks.

use crate::domain::config::OverrideConfig;
use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{
    BatchId, BatchPromotionRuleId, BatchRuleOverride, BatchSemesterId, BatchSubjectId, OverrideId,
    OverrideRuleType, Timestamp, UserId,
};
use uuid::Uuid;

/// Who approved an exception and on what grounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub reason: String,
    pub approved_by_id: UserId,
    #[serde(default)]
    pub document_ref: Option<String>,
}

impl Approval {
    /// Check reason and document reference against the policy.
    pub fn check(&self, config: &OverrideConfig) -> LedgerResult<()> {
        let reason = self.reason.trim();
        if reason.is_empty() || reason.chars().count() < config.min_reason_len {
            return Err(LedgerError::MissingReason {
                min_len: config.min_reason_len.max(1),
            });
        }
        let has_document = self
            .document_ref
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if config.require_document_ref && !has_document {
            return Err(LedgerError::MissingDocumentRef);
        }
        Ok(())
    }

    fn normalized_document_ref(&self) -> Option<String> {
        self.document_ref
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

/// A ledger entry whose old and new values are supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOverride {
    pub batch_id: BatchId,
    pub rule_type: OverrideRuleType,
    #[serde(default)]
    pub rule_id: Option<Uuid>,
    pub old_value: Value,
    pub new_value: Value,
    #[serde(flatten)]
    pub approval: Approval,
}

/// Change to a single frozen row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAmendment {
    /// Replace a subject's credits.
    SubjectCredits {
        subject_id: BatchSubjectId,
        credits: f64,
    },
    /// Replace one or both credit thresholds of a semester.
    SemesterCredits {
        semester_id: BatchSemesterId,
        total_credits: Option<f64>,
        min_credits_required: Option<f64>,
    },
    /// Replace the threshold that the promotion rule's type reads.
    PromotionThreshold {
        rule_id: BatchPromotionRuleId,
        threshold: f64,
    },
}

impl RuleAmendment {
    pub fn rule_type(&self) -> OverrideRuleType {
        match self {
            RuleAmendment::SubjectCredits { .. } => OverrideRuleType::Subject,
            RuleAmendment::SemesterCredits { .. } => OverrideRuleType::Semester,
            RuleAmendment::PromotionThreshold { .. } => OverrideRuleType::PromotionRule,
        }
    }

    pub fn row_id(&self) -> Uuid {
        match self {
            RuleAmendment::SubjectCredits { subject_id, .. } => subject_id.0,
            RuleAmendment::SemesterCredits { semester_id, .. } => semester_id.0,
            RuleAmendment::PromotionThreshold { rule_id, .. } => rule_id.0,
        }
    }
}

/// An amendment of a frozen row, recorded in the ledger in the same write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmendmentRequest {
    pub batch_id: BatchId,
    pub amendment: RuleAmendment,
    #[serde(flatten)]
    pub approval: Approval,
}

/// Everything needed to write one ledger entry except its sequence.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingEntry {
    pub batch_id: BatchId,
    pub rule_type: OverrideRuleType,
    pub rule_id: Option<Uuid>,
    pub old_value: Value,
    pub new_value: Value,
    pub approval: Approval,
}

impl PendingEntry {
    pub fn into_entry(self, sequence: u64, now: Timestamp) -> BatchRuleOverride {
        let document_ref = self.approval.normalized_document_ref();
        BatchRuleOverride {
            id: OverrideId::new(),
            batch_id: self.batch_id,
            sequence,
            rule_type: self.rule_type,
            rule_id: self.rule_id,
            old_value: self.old_value,
            new_value: self.new_value,
            reason: self.approval.reason.trim().to_string(),
            document_ref,
            approved_by_id: self.approval.approved_by_id,
            created_at: now,
        }
    }
}

impl From<NewOverride> for PendingEntry {
    fn from(new: NewOverride) -> Self {
        Self {
            batch_id: new.batch_id,
            rule_type: new.rule_type,
            rule_id: new.rule_id,
            old_value: new.old_value,
            new_value: new.new_value,
            approval: new.approval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval(reason: &str, document_ref: Option<&str>) -> Approval {
        Approval {
            reason: reason.into(),
            approved_by_id: UserId::new(),
            document_ref: document_ref.map(str::to_string),
        }
    }

    #[test]
    fn test_blank_reason_rejected() {
        let config = OverrideConfig::default().with_min_reason_len(0);
        assert_eq!(
            approval("   ", None).check(&config),
            Err(LedgerError::MissingReason { min_len: 1 })
        );
        assert!(approval("ok", None).check(&config).is_ok());
    }

    #[test]
    fn test_short_reason_accepted_by_default() {
        let config = OverrideConfig::default();
        assert!(approval("Typo fix", None).check(&config).is_ok());
        assert!(approval("x", None).check(&config).is_ok());
        assert_eq!(
            approval("", None).check(&config),
            Err(LedgerError::MissingReason { min_len: 1 })
        );
    }

    #[test]
    fn test_configured_minimum_rejects_short_reason() {
        let config = OverrideConfig::default().with_min_reason_len(10);
        assert!(matches!(
            approval("  too short ", None).check(&config),
            Err(LedgerError::MissingReason { min_len: 10 })
        ));
        assert!(approval("Academic council resolution", None)
            .check(&config)
            .is_ok());
    }

    #[test]
    fn test_document_ref_policy() {
        let config = OverrideConfig::default().with_require_document_ref(true);
        let reason = "Academic council resolution";
        assert_eq!(
            approval(reason, None).check(&config),
            Err(LedgerError::MissingDocumentRef)
        );
        assert_eq!(
            approval(reason, Some("  ")).check(&config),
            Err(LedgerError::MissingDocumentRef)
        );
        assert!(approval(reason, Some("AC/2024/17")).check(&config).is_ok());
    }

    #[test]
    fn test_amendment_wire_format() {
        let json = r#"{"kind":"SUBJECT_CREDITS","subject_id":"6f1d5a52-3f0b-4c55-9a4b-0d1a1b2c3d4e","credits":3.0}"#;
        let amendment: RuleAmendment = serde_json::from_str(json).unwrap();
        assert_eq!(amendment.rule_type(), OverrideRuleType::Subject);
    }

    #[test]
    fn test_entry_trims_reason() {
        let pending = PendingEntry {
            batch_id: BatchId::new(),
            rule_type: OverrideRuleType::Semester,
            rule_id: None,
            old_value: Value::Null,
            new_value: Value::Null,
            approval: approval("  Council resolution 12  ", Some(" ")),
        };
        let entry = pending.into_entry(4, 99);
        assert_eq!(entry.sequence, 4);
        assert_eq!(entry.reason, "Council resolution 12");
        assert_eq!(entry.document_ref, None);
        assert_eq!(entry.created_at, 99);
    }
}
