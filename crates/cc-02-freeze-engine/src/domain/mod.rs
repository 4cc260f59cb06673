//! # Domain Layer
//!
//! - `checksum` - Canonical rule-set rendering and SHA-256 tamper anchor
//! - `snapshot` - Field-by-field copy of regulation rows into batch rows
//! - `commands` - Batch registration payload
//! - `config` - Freeze policy switches
//! - `integrity` - Integrity verification report

pub mod checksum;
pub mod commands;
pub mod config;
pub mod integrity;
pub mod snapshot;
