//! # cc-03-promotion
//!
//! Decides whether a student may move into the next academic year.
//!
//! ## Overview
//!
//! - **Frozen rules only**: eligibility is judged against the promotion rule
//!   and semester rows of the student's frozen batch, never against the
//!   regulation the batch came from.
//! - **All rules apply**: when several rules govern the same transition they
//!   must all pass. Every failed rule contributes one violation message.
//! - **Dry run**: evaluation never writes. Callers perform the promotion
//!   themselves once a verdict is eligible.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cc_03_promotion::{PromotionApi, PromotionEvaluator, InMemoryAcademicHistory};
//!
//! let evaluator = PromotionEvaluator::new(store, history);
//! let verdict = evaluator.evaluate(student_id, 2, true)?;
//! for violation in &verdict.violations {
//!     println!("{violation}");
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryAcademicHistory, StudentHistory};
pub use domain::{assess, EligibilityResult, RuleOutcome};
pub use error::{HistoryError, PromotionError, PromotionResult};
pub use ports::{AcademicHistoryProvider, PromotionApi};
pub use service::PromotionEvaluator;
