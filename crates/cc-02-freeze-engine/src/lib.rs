//! # cc-02-freeze-engine
//!
//! Freezes a regulation's rules into an academic batch.
//!
//! ## Overview
//!
//! - **Snapshot**: one batch row per regulation semester, subject and
//!   promotion rule, plus the regulation's global terms. Later regulation
//!   edits never reach these rows.
//! - **Tamper anchor**: the batch is stamped with the SHA-256 checksum of the
//!   canonical rule set. The same checksum can be recomputed from the batch
//!   rows alone (`verify_integrity`).
//! - **Single freeze**: the freeze is one conditional write that expects the
//!   batch to still be unfrozen. A second freeze fails with
//!   `BatchAlreadyFrozen` and leaves the first stamps in place.
//! - **Lock on freeze**: the source regulation is locked in the same write.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cc_02_freeze_engine::{FreezeEngine, FreezeEngineApi, FreezeConfig};
//!
//! let engine = FreezeEngine::new(store, clock, FreezeConfig::default());
//! let batch = engine.register_batch(new_batch)?;
//! let frozen = engine.freeze(batch.id, admin_id)?;
//! assert!(engine.verify_integrity(frozen.id)?.matches);
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod repository;
pub mod service;

pub use domain::checksum::{
    canonical_rule_set, canonical_snapshot, checksum_rule_set, checksum_snapshot, is_well_formed,
    CHECKSUM_HEX_LEN,
};
pub use domain::commands::NewBatch;
pub use domain::config::FreezeConfig;
pub use domain::integrity::IntegrityReport;
pub use error::{FreezeError, FreezeResult};
pub use ports::inbound::FreezeEngineApi;
pub use repository::BatchRepository;
pub use service::FreezeEngine;
