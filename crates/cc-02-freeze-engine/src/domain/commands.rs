//! Batch registration payload.

use serde::{Deserialize, Serialize};
use shared_types::{AcademicBatch, BatchId, ProgramId, RegulationId, Timestamp, ValidationError};

/// Payload for registering an academic batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBatch {
    pub code: String,
    pub name: String,
    pub program_id: ProgramId,
    pub admission_year: u16,
    pub regulation_id: RegulationId,
}

impl NewBatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::new("code", "must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        if !(1900..=9999).contains(&self.admission_year) {
            return Err(ValidationError::new(
                "admission_year",
                format!("{} is not a plausible year", self.admission_year),
            ));
        }
        Ok(())
    }

    /// An unfrozen batch: every freeze stamp is absent.
    pub fn into_batch(self, now: Timestamp) -> AcademicBatch {
        AcademicBatch {
            id: BatchId::new(),
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            program_id: self.program_id,
            admission_year: self.admission_year,
            regulation_id: self.regulation_id,
            regulation_code: None,
            frozen_at: None,
            frozen_by_id: None,
            freeze_checksum: None,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_batch() -> NewBatch {
        NewBatch {
            code: " B2024 ".into(),
            name: "Batch 2024".into(),
            program_id: ProgramId::new(),
            admission_year: 2024,
            regulation_id: RegulationId::new(),
        }
    }

    #[test]
    fn test_new_batch_is_unfrozen() {
        let batch = new_batch().into_batch(7);
        assert_eq!(batch.code, "B2024");
        assert!(!batch.is_frozen());
        assert!(batch.freeze_checksum.is_none());
        assert!(batch.regulation_code.is_none());
    }

    #[test]
    fn test_implausible_year_rejected() {
        let mut batch = new_batch();
        batch.admission_year = 24;
        assert_eq!(batch.validate().unwrap_err().field, "admission_year");
    }
}
