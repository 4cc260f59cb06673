//! # Error Types
//!
//! Cross-crate error classification. Each subsystem keeps its own error enum;
//! this category is what the surrounding web layer maps to a status code.

use std::fmt;

/// Coarse classification of a domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Referenced entity does not exist.
    NotFound,
    /// Request conflicts with current state (locked, frozen, stale version).
    Conflict,
    /// Request payload is invalid.
    Validation,
    /// Storage failure or broken internal invariant.
    Internal,
}

impl ErrorCategory {
    /// HTTP status the request boundary reports for this category.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::Validation => 400,
            ErrorCategory::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCategory::NotFound.http_status(), 404);
        assert_eq!(ErrorCategory::Conflict.http_status(), 409);
        assert_eq!(ErrorCategory::Validation.http_status(), 400);
        assert_eq!(ErrorCategory::Internal.http_status(), 500);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("credits", "must be finite");
        assert_eq!(err.to_string(), "invalid credits: must be finite");
    }
}
