//! # Entity Identifiers
//!
//! UUID-backed newtypes, one per entity kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifier of a regulation (rule template).
    RegulationId
);
entity_id!(
    /// Identifier of an academic program (owned by the program catalogue).
    ProgramId
);
entity_id!(
    /// Identifier of a regulation semester row.
    SemesterId
);
entity_id!(
    /// Identifier of a regulation subject row.
    SubjectId
);
entity_id!(
    /// Identifier of a regulation promotion rule row.
    PromotionRuleId
);
entity_id!(
    /// Identifier of an academic batch (student cohort).
    BatchId
);
entity_id!(
    /// Identifier of a frozen batch semester row.
    BatchSemesterId
);
entity_id!(
    /// Identifier of a frozen batch subject row.
    BatchSubjectId
);
entity_id!(
    /// Identifier of a frozen batch promotion rule row.
    BatchPromotionRuleId
);
entity_id!(
    /// Identifier of an override ledger entry.
    OverrideId
);
entity_id!(
    /// Identifier of a student (owned by the Student subsystem).
    StudentId
);
entity_id!(
    /// Identifier of a staff user acting on the core (actor or approver).
    UserId
);
