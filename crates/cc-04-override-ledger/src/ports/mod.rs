//! # Ports Layer
//!
//! - **Inbound**: [`OverrideLedgerApi`]
//! - **Outbound**: [`ApproverDirectory`], who may sign off an override

pub mod inbound;
pub mod outbound;

pub use inbound::OverrideLedgerApi;
pub use outbound::ApproverDirectory;
