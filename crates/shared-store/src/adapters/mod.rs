//! # Adapters Module
//!
//! - `memory`: In-memory store for tests and ephemeral runs
//! - `file`: File-backed store for the admin binary
//! - `lock`: Process lock guarding the file-backed store (single writer)
//! - `time`: System and manual clocks

mod file;
mod lock;
mod memory;
mod time;

pub use file::FileBackedKVStore;
pub use lock::{DatabaseLock, LockError};
pub use memory::InMemoryKVStore;
pub use time::{ManualTimeSource, SystemTimeSource};

use crate::errors::KVStoreError;
use crate::keys::display_key;
use crate::ports::{BatchOperation, ScanResult};
use std::collections::BTreeMap;

/// Apply a batch to an ordered map.
///
/// Every precondition is checked before the first mutation, so a failed
/// precondition leaves `data` untouched.
pub(crate) fn apply_batch(
    data: &mut BTreeMap<Vec<u8>, Vec<u8>>,
    operations: Vec<BatchOperation>,
) -> Result<(), KVStoreError> {
    for op in &operations {
        if let BatchOperation::Expect { key, value } = op {
            if data.get(key) != value.as_ref() {
                tracing::debug!(key = %display_key(key), "conditional write rejected");
                return Err(KVStoreError::PreconditionFailed {
                    key: display_key(key),
                });
            }
        }
    }

    for op in operations {
        match op {
            BatchOperation::Put { key, value } => {
                data.insert(key, value);
            }
            BatchOperation::Delete { key } => {
                data.remove(&key);
            }
            BatchOperation::Expect { .. } => {}
        }
    }
    Ok(())
}

pub(crate) fn scan_prefix(data: &BTreeMap<Vec<u8>, Vec<u8>>, prefix: &[u8]) -> ScanResult {
    data.range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
