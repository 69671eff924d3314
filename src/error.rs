//! Error types for the notice-drafter library.
//!
//! This module provides custom error types using `thiserror` so callers can tell
//! recoverable input problems apart from a failed storage medium.

use thiserror::Error;

/// Errors that can occur in the notice-drafter application.
#[derive(Error, Debug)]
pub enum NoticeError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected user input (empty message, bad date filter, bad template)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The store was used after `close`
    #[error("Message store is closed")]
    StoreClosed,

    /// A thread panicked while holding the store connection
    #[error("Message store lock poisoned")]
    LockPoisoned,

    /// Translation backend failure
    #[error("Translation error: {0}")]
    Translation(String),
}

impl NoticeError {
    /// Build a validation error from anything printable.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the caller can show the error to the user and carry on.
    ///
    /// Only validation errors are recoverable. Storage failures end the
    /// current operation sequence.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience type alias for Result with NoticeError
pub type Result<T> = std::result::Result<T, NoticeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_validation_is_recoverable() {
        assert!(NoticeError::validation("empty").is_recoverable());
        assert!(!NoticeError::StoreClosed.is_recoverable());
        assert!(!NoticeError::LockPoisoned.is_recoverable());
        assert!(!NoticeError::Translation("offline".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = NoticeError::validation("Please enter a message to convert.");
        assert_eq!(err.to_string(), "Validation error: Please enter a message to convert.");
    }
}
