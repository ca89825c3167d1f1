//! Custom error types for the composition engine
//!
//! This module defines the error hierarchy for the engine using thiserror
//! for ergonomic error definitions. Accounting conditions that the caller
//! renders inline (imbalance, split drift) are not errors; they travel as
//! data on `BalanceSummary` and `SubmitBlocked`.

use thiserror::Error;

/// The main error type for composition engine operations
#[derive(Error, Debug)]
pub enum ComposerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Attempt to remove the only remaining line of an entry
    #[error("An entry must keep at least one line")]
    EmptyEntry,

    /// The draft has been submitted and can no longer be edited
    #[error("Entry is locked: {0}")]
    Locked(String),

    /// A suggestion cannot be applied to the current draft
    #[error("Suggestion not applicable: {0}")]
    NotApplicable(String),

    /// Text analysis failed
    #[error("Analysis error: {0}")]
    Analysis(String),
}

impl ComposerError {
    /// Create a "not found" error for entry lines
    pub fn line_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Line",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for suggestions
    pub fn suggestion_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Suggestion",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for ComposerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ComposerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for composition engine operations
pub type ComposerResult<T> = Result<T, ComposerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ComposerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = ComposerError::line_not_found("lin-1234abcd");
        assert_eq!(err.to_string(), "Line not found: lin-1234abcd");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_empty_entry_error() {
        let err = ComposerError::EmptyEntry;
        assert_eq!(err.to_string(), "An entry must keep at least one line");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ComposerError = io_err.into();
        assert!(matches!(err, ComposerError::Io(_)));
    }
}
