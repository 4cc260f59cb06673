//! Outbound port to the student subsystem.

use crate::error::HistoryError;
use shared_types::{BatchId, SemesterRecord, StudentId};
use std::sync::Arc;

/// Read-only access to enrolments and semester results.
pub trait AcademicHistoryProvider: Send + Sync {
    /// Batch the student is enrolled in, if any.
    fn batch_of(&self, student_id: StudentId) -> Result<Option<BatchId>, HistoryError>;

    /// Every recorded semester result, oldest first.
    fn semester_records(&self, student_id: StudentId) -> Result<Vec<SemesterRecord>, HistoryError>;
}

impl<T: AcademicHistoryProvider + ?Sized> AcademicHistoryProvider for Arc<T> {
    fn batch_of(&self, student_id: StudentId) -> Result<Option<BatchId>, HistoryError> {
        (**self).batch_of(student_id)
    }

    fn semester_records(&self, student_id: StudentId) -> Result<Vec<SemesterRecord>, HistoryError> {
        (**self).semester_records(student_id)
    }
}
