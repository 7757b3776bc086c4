//! Parse errors for version strings.

use thiserror::Error;

/// Result type for version parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors produced when a version string is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not a `major.minor.patch` triple.
    #[error("invalid version number {0:?}")]
    InvalidNumber(String),

    /// Not a `major.minor.patch-os-arch` string.
    #[error("invalid binary version {0:?}")]
    InvalidBinary(String),

    /// An OS or architecture tag that cannot appear in a binary version.
    #[error("invalid {kind} tag {value:?}")]
    InvalidTag {
        /// Which component was rejected.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Not an `os-arch` pair.
    #[error("invalid platform {0:?}")]
    InvalidPlatform(String),
}
