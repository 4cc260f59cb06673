//! # Ports Layer
//!
//! - **Inbound**: [`PromotionApi`], what callers invoke.
//! - **Outbound**: [`AcademicHistoryProvider`], where student results come from.

pub mod inbound;
pub mod outbound;

pub use inbound::PromotionApi;
pub use outbound::AcademicHistoryProvider;
