//! # Ports Layer
//!
//! - `inbound.rs` - Driving port (API exposed to the admin layer, the
//!   promotion evaluator and the override ledger)

pub mod inbound;
