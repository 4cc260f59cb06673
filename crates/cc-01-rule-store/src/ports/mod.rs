//! # Ports Layer
//!
//! - `inbound.rs` - Driving port (API exposed to the freeze engine and the admin layer)
//!
//! The driven ports (`KeyValueStore`, `TimeSource`) live in `shared-store`
//! because every subsystem writes through the same store.

pub mod inbound;
