//! # cc-01-rule-store
//!
//! Rule Store for academic regulations: the mutable template of subjects,
//! semester credit thresholds and promotion rules that a batch is later
//! frozen from.
//!
//! ## Overview
//!
//! - **Versioned edits**: every edit of a regulation or one of its child rows
//!   names the version it was based on and bumps it. A stale version is
//!   rejected with `VersionConflict`.
//! - **Lock enforcement**: a locked regulation rejects every edit with
//!   `RegulationLocked`. Locking happens once, either explicitly here or as
//!   part of freezing a batch.
//! - **Atomic writes**: each operation is a single conditional batch against
//!   the shared key-value store, guarded on the regulation record it read.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cc_01_rule_store::{RuleStoreApi, RuleStoreService, NewRegulation};
//!
//! let service = RuleStoreService::new(store, clock);
//! let regulation = service.create_regulation(new_regulation)?;
//! let semester = service.add_semester(regulation.id, regulation.version, new_semester)?;
//! let locked = service.lock_regulation(regulation.id, admin_id)?;
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod repository;
pub mod service;

pub use domain::commands::{
    NewPromotionRule, NewRegulation, NewSemester, NewSubject, PromotionRuleUpdate,
    RegulationUpdate, SemesterUpdate, SubjectUpdate,
};
pub use error::{RuleStoreError, RuleStoreResult};
pub use ports::inbound::RuleStoreApi;
pub use repository::{RegulationRepository, StoredRuleSet};
pub use service::RuleStoreService;
