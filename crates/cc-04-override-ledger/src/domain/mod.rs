//! Override domain: requests, policy, row amendments and audit reports.

pub mod amendment;
pub mod config;
pub mod report;
pub mod request;

pub use config::{OverrideConfig, DEFAULT_MIN_REASON_LEN};
pub use report::AuditReport;
pub use request::{AmendmentRequest, Approval, NewOverride, RuleAmendment};
