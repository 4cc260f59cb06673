//! Integrity verification report.

use serde::{Deserialize, Serialize};
use shared_types::BatchId;

/// Outcome of recomputing a frozen batch's checksum from its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub batch_id: BatchId,
    /// Checksum stamped on the batch at freeze time.
    pub stored_checksum: String,
    /// Checksum of the batch rows as they are now.
    pub recomputed_checksum: String,
    pub matches: bool,
}

impl IntegrityReport {
    pub fn new(batch_id: BatchId, stored_checksum: String, recomputed_checksum: String) -> Self {
        let matches = stored_checksum == recomputed_checksum;
        Self {
            batch_id,
            stored_checksum,
            recomputed_checksum,
            matches,
        }
    }
}
