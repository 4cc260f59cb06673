use crate::error::HistoryError;
use crate::ports::AcademicHistoryProvider;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{BatchId, SemesterRecord, StudentId};
use std::collections::HashMap;

/// One student's enrolment and results, as exchanged in history files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentHistory {
    pub student_id: StudentId,
    pub batch_id: BatchId,
    #[serde(default)]
    pub records: Vec<SemesterRecord>,
}

/// In-memory academic history.
///
/// Stands in for the student subsystem in tests and in the CLI, which loads
/// histories from a JSON file.
#[derive(Default)]
pub struct InMemoryAcademicHistory {
    enrolments: RwLock<HashMap<StudentId, BatchId>>,
    records: RwLock<HashMap<StudentId, Vec<SemesterRecord>>>,
}

impl InMemoryAcademicHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_histories(histories: Vec<StudentHistory>) -> Self {
        let history = Self::new();
        for entry in histories {
            history.enroll(entry.student_id, entry.batch_id);
            for mut record in entry.records {
                record.student_id = entry.student_id;
                history.record(record);
            }
        }
        history
    }

    pub fn enroll(&self, student_id: StudentId, batch_id: BatchId) {
        self.enrolments.write().insert(student_id, batch_id);
    }

    /// Append a semester result. Later records for the same semester
    /// supersede earlier ones at evaluation time.
    pub fn record(&self, record: SemesterRecord) {
        self.records
            .write()
            .entry(record.student_id)
            .or_default()
            .push(record);
    }

    pub fn student_count(&self) -> usize {
        self.enrolments.read().len()
    }
}

impl AcademicHistoryProvider for InMemoryAcademicHistory {
    fn batch_of(&self, student_id: StudentId) -> Result<Option<BatchId>, HistoryError> {
        Ok(self.enrolments.read().get(&student_id).copied())
    }

    fn semester_records(&self, student_id: StudentId) -> Result<Vec<SemesterRecord>, HistoryError> {
        Ok(self
            .records
            .read()
            .get(&student_id)
            .cloned()
            .unwrap_or_default())
    }
}
