//! # cc-04-override-ledger
//!
//! Append-only audit trail of exceptional changes to frozen batch rules.
//!
//! ## Overview
//!
//! - **Admission**: an override needs a non-blank reason of the configured
//!   minimum length, an approver known to the [`ApproverDirectory`] and,
//!   when configured, a supporting document reference. A rejected request
//!   leaves no entry behind.
//! - **Ordering**: entries carry a per-batch sequence. Each append claims
//!   the next empty slot in a conditional write.
//! - **Amendments**: `apply_override` changes one frozen row and records the
//!   before and after values in the same write.
//! - **Audit**: `audit_batch` recomputes the batch checksum and reports
//!   whether any drift is accounted for by the ledger.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cc_04_override_ledger::{OverrideLedger, OverrideLedgerApi, OverrideConfig};
//!
//! let ledger = OverrideLedger::new(store, clock, approvers, OverrideConfig::default());
//! let entry = ledger.record_override(new_override)?;
//! let report = ledger.audit_batch(entry.batch_id)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod repository;
pub mod service;

pub use adapters::StaticApproverDirectory;
pub use domain::{
    AmendmentRequest, Approval, AuditReport, NewOverride, OverrideConfig, RuleAmendment,
    DEFAULT_MIN_REASON_LEN,
};
pub use error::{LedgerError, LedgerResult};
pub use ports::{ApproverDirectory, OverrideLedgerApi};
pub use repository::OverrideRepository;
pub use service::OverrideLedger;
