//! Error types for blob store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for blob store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing a blob store.
#[derive(Error, Debug)]
pub enum Error {
    /// The named object does not exist.
    #[error("file {name:?} not found")]
    NotFound {
        /// The object name.
        name: String,
    },

    /// The object name cannot be stored.
    #[error("invalid object name {name:?}: {reason}")]
    InvalidName {
        /// The object name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The content stream did not match the declared length.
    #[error("object {name:?}: expected {expected} bytes, read {actual}")]
    LengthMismatch {
        /// The object name.
        name: String,
        /// Length passed to `put`.
        expected: u64,
        /// Bytes actually read.
        actual: u64,
    },

    /// Underlying I/O failure.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" on {}", p.display())).unwrap_or_default())]
    Io {
        /// The I/O error.
        #[source]
        source: std::io::Error,
        /// Path involved, if any.
        path: Option<PathBuf>,
        /// What was being attempted.
        operation: String,
    },
}

impl Error {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an invalid-name error.
    #[must_use]
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
            operation: operation.into(),
        }
    }

    /// Whether this error means the object does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = Error::not_found("tools/x.tgz");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "file \"tools/x.tgz\" not found");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = Error::io(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            "/srv/store/a",
            "write",
        );
        assert!(!err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("write"));
        assert!(msg.contains("/srv/store/a"));
    }
}
