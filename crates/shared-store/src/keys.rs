//! # Key Layout
//!
//! All keys are prefixed to namespace different entity kinds. Child rows are
//! keyed under their owner so an owner's rows come back from one prefix scan.
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `reg:` | `reg:{regulation}` | `Regulation` |
//! | `regcode:` | `regcode:{code}` | regulation id |
//! | `regsem:` | `regsem:{regulation}:{row}` | `RegulationSemester` |
//! | `regsub:` | `regsub:{regulation}:{row}` | `RegulationSubject` |
//! | `regrule:` | `regrule:{regulation}:{row}` | `RegulationPromotionRule` |
//! | `batch:` | `batch:{batch}` | `AcademicBatch` |
//! | `batchcode:` | `batchcode:{code}` | batch id |
//! | `bterms:` | `bterms:{batch}` | `BatchRegulationTerms` |
//! | `bsem:` | `bsem:{batch}:{row}` | `BatchSemester` |
//! | `bsub:` | `bsub:{batch}:{row}` | `BatchSubject` |
//! | `brule:` | `brule:{batch}:{row}` | `BatchPromotionRule` |
//! | `ovr:` | `ovr:{batch}:{sequence:020}` | `BatchRuleOverride` |

use std::fmt::Display;

/// Key prefixes for the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    Regulation,
    RegulationCode,
    RegulationSemester,
    RegulationSubject,
    RegulationPromotionRule,
    Batch,
    BatchCode,
    BatchTerms,
    BatchSemester,
    BatchSubject,
    BatchPromotionRule,
    Override,
}

impl KeyPrefix {
    /// Get the prefix bytes.
    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPrefix::Regulation => "reg:",
            KeyPrefix::RegulationCode => "regcode:",
            KeyPrefix::RegulationSemester => "regsem:",
            KeyPrefix::RegulationSubject => "regsub:",
            KeyPrefix::RegulationPromotionRule => "regrule:",
            KeyPrefix::Batch => "batch:",
            KeyPrefix::BatchCode => "batchcode:",
            KeyPrefix::BatchTerms => "bterms:",
            KeyPrefix::BatchSemester => "bsem:",
            KeyPrefix::BatchSubject => "bsub:",
            KeyPrefix::BatchPromotionRule => "brule:",
            KeyPrefix::Override => "ovr:",
        }
    }

    /// Key of a top-level entity: `{prefix}{id}`.
    pub fn key(&self, id: impl Display) -> Vec<u8> {
        format!("{}{}", self.as_str(), id).into_bytes()
    }

    /// Key of a row owned by `owner`: `{prefix}{owner}:{row}`.
    pub fn child_key(&self, owner: impl Display, row: impl Display) -> Vec<u8> {
        format!("{}{}:{}", self.as_str(), owner, row).into_bytes()
    }

    /// Prefix covering every row owned by `owner`.
    pub fn owner_prefix(&self, owner: impl Display) -> Vec<u8> {
        format!("{}{}:", self.as_str(), owner).into_bytes()
    }

    /// Key of an override ledger entry. The sequence is zero-padded so that
    /// a prefix scan returns entries in ledger order.
    pub fn override_key(batch: impl Display, sequence: u64) -> Vec<u8> {
        format!("{}{}:{:020}", KeyPrefix::Override.as_str(), batch, sequence).into_bytes()
    }
}

/// Render a key for logs and error messages.
pub fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_do_not_shadow_each_other() {
        let all = [
            KeyPrefix::Regulation,
            KeyPrefix::RegulationCode,
            KeyPrefix::RegulationSemester,
            KeyPrefix::RegulationSubject,
            KeyPrefix::RegulationPromotionRule,
            KeyPrefix::Batch,
            KeyPrefix::BatchCode,
            KeyPrefix::BatchTerms,
            KeyPrefix::BatchSemester,
            KeyPrefix::BatchSubject,
            KeyPrefix::BatchPromotionRule,
            KeyPrefix::Override,
        ];
        for a in &all {
            for b in &all {
                if a != b {
                    assert!(
                        !a.as_str().starts_with(b.as_str()),
                        "{} shadows {}",
                        b.as_str(),
                        a.as_str()
                    );
                }
            }
        }
    }

    #[test]
    fn test_child_key_under_owner_prefix() {
        let key = KeyPrefix::BatchSubject.child_key("b1", "s1");
        assert_eq!(key, b"bsub:b1:s1".to_vec());
        assert!(key.starts_with(&KeyPrefix::BatchSubject.owner_prefix("b1")));
    }

    #[test]
    fn test_override_keys_sort_by_sequence() {
        let k2 = KeyPrefix::override_key("b", 2);
        let k10 = KeyPrefix::override_key("b", 10);
        assert!(k2 < k10);
    }
}
