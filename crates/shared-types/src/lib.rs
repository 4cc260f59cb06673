//! # Shared Types Crate
//!
//! This crate contains all academic entities used across the Campus-Core
//! subsystems: the mutable regulation rule rows, the frozen batch snapshot
//! rows, the override ledger and the read-only student history facts.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Explicit Mapping**: Snapshot rows are built from regulation rows by
//!   dedicated constructors, never by spreading arbitrary payload fields.
//! - **Typed Identity**: Every entity has its own identifier newtype so a
//!   subject id can never be passed where a batch id is expected.

pub mod entities;
pub mod errors;
pub mod ids;

pub use entities::*;
pub use errors::*;
pub use ids::*;
