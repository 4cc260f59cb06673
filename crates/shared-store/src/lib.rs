//! # Shared Store
//!
//! Persistence seam for every Campus-Core subsystem.
//!
//! The domain crates never talk to a database directly. They build a list of
//! [`BatchOperation`]s and hand it to a [`KeyValueStore`], which applies the
//! whole list atomically: either every operation lands or none does.
//!
//! ## Conditional Writes
//!
//! A batch may carry [`BatchOperation::Expect`] preconditions. All of them are
//! checked under the same write lock that applies the batch, so a batch that
//! expects "the batch record is still unfrozen" is the equivalent of
//! `UPDATE ... WHERE frozen_at IS NULL` in a relational store. A failed
//! precondition rejects the entire batch with
//! [`KVStoreError::PreconditionFailed`].
//!
//! ## Crate Structure
//!
//! - `ports` - `KeyValueStore` and `TimeSource` driven ports
//! - `keys` - Key layout for every entity kind
//! - `codec` - JSON entity encoding
//! - `adapters/` - In-memory store, file-backed store, process lock, clocks

pub mod adapters;
pub mod codec;
pub mod errors;
pub mod keys;
pub mod ports;

pub use adapters::{
    DatabaseLock, FileBackedKVStore, InMemoryKVStore, LockError, ManualTimeSource,
    SystemTimeSource,
};
pub use codec::{decode, encode, Stored};
pub use errors::KVStoreError;
pub use keys::KeyPrefix;
pub use ports::{BatchOperation, KeyValueStore, ScanResult, TimeSource};
