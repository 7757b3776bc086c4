//! Error types for tool bundle operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tool bundle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while packaging, resolving or fetching bundles.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The store holds no well-formed bundles under the searched prefix.
    #[error("no tools available")]
    #[diagnostic(
        code(tooldist::tools::no_tools),
        help("Upload tools with 'tooldist put' or point --storage at a populated store")
    )]
    NoTools,

    /// Bundles exist, but none match the requested version or platform.
    #[error("no matching tools available")]
    #[diagnostic(
        code(tooldist::tools::no_matches),
        help("Run 'tooldist list' to see which versions the store carries")
    )]
    NoMatches,

    /// A directory entry scheduled for archiving is not a regular executable.
    #[error("archive: found non-executable file {}", path.display())]
    #[diagnostic(
        code(tooldist::tools::archive),
        help("Bundle directories may only contain regular files with the owner execute bit set")
    )]
    Archive {
        /// The offending path.
        path: PathBuf,
    },

    /// An archive entry name could escape the destination directory.
    #[error("bad name {name:?} in tools archive")]
    #[diagnostic(code(tooldist::tools::bad_entry_name))]
    BadEntryName {
        /// The entry name as stored in the archive.
        name: String,
    },

    /// Writing an extracted entry failed.
    #[error("tar extract {} failed: {source}", path.display())]
    #[diagnostic(code(tooldist::tools::extract))]
    Extract {
        /// Destination path of the entry.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Blob store failure.
    #[error(transparent)]
    #[diagnostic(code(tooldist::storage))]
    Storage(#[from] tooldist_storage::Error),

    /// Malformed version string.
    #[error(transparent)]
    #[diagnostic(code(tooldist::version))]
    Version(#[from] tooldist_version::ParseError),

    /// Local filesystem failure.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" on {}", p.display())).unwrap_or_default())]
    #[diagnostic(code(tooldist::io))]
    Io {
        /// The underlying error.
        #[source]
        source: std::io::Error,
        /// Path involved, if any.
        path: Option<PathBuf>,
        /// What was being attempted.
        operation: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(tooldist::config), help("{help}"))]
    Config {
        /// The error message.
        message: String,
        /// Help text for the user.
        help: String,
    },
}

impl Error {
    /// Create an archive precondition error.
    #[must_use]
    pub fn archive(path: impl Into<PathBuf>) -> Self {
        Self::Archive { path: path.into() }
    }

    /// Create a bad entry name error.
    #[must_use]
    pub fn bad_entry_name(name: impl Into<String>) -> Self {
        Self::BadEntryName { name: name.into() }
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

    /// Create an I/O error without a path.
    #[must_use]
    pub fn io_op(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: None,
            operation: operation.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Whether the store held no well-formed bundles.
    #[must_use]
    pub const fn is_no_tools(&self) -> bool {
        matches!(self, Self::NoTools)
    }

    /// Whether bundles existed but none matched.
    #[must_use]
    pub const fn is_no_matches(&self) -> bool {
        matches!(self, Self::NoMatches)
    }

    /// Whether a store object was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_not_found())
    }
}
