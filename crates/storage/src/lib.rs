//! Blob store contract consumed by tooldist.
//!
//! A store maps flat, `/`-separated object names to byte streams. This crate
//! defines the read and write halves of that contract and ships three local
//! backends:
//!
//! - [`FileStorage`]: objects as files beneath a root directory
//! - [`MemoryStorage`]: objects held in memory, for tests and dry runs
//! - [`EmptyStorage`]: a reader that contains nothing

#![warn(missing_docs)]

mod empty;
mod error;
mod file;
mod memory;

pub use empty::EmptyStorage;
pub use error::{Error, Result};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::io::Read;

/// Read access to a blob store.
pub trait StorageReader: Send + Sync {
    /// Open the named object for reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such object exists.
    fn get(&self, name: &str) -> Result<Box<dyn Read + Send>>;

    /// List the names of all objects starting with `prefix`, sorted.
    ///
    /// An empty result is not an error.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Resolve a fetchable address for the named object.
    fn url(&self, name: &str) -> Result<String>;

    /// Size of the named object in bytes.
    ///
    /// The default implementation reads the whole object; backends that can
    /// stat objects should override it.
    fn size(&self, name: &str) -> Result<u64> {
        let mut r = self.get(name)?;
        std::io::copy(&mut r, &mut std::io::sink()).map_err(|e| Error::Io {
            source: e,
            path: None,
            operation: format!("read {name:?}"),
        })
    }
}

/// Write access to a blob store.
pub trait StorageWriter: Send + Sync {
    /// Write `length` bytes from `r` under `name`, replacing any existing
    /// object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `r` does not yield exactly
    /// `length` bytes; nothing is stored in that case.
    fn put(&self, name: &str, r: &mut dyn Read, length: u64) -> Result<()>;

    /// Remove the named object. Removing a missing object succeeds.
    fn remove(&self, name: &str) -> Result<()>;
}

/// A store that can be both read and written.
pub trait Storage: StorageReader + StorageWriter {
    /// This store as a plain reader.
    fn as_reader(&self) -> &dyn StorageReader;
}

impl<T: StorageReader + StorageWriter> Storage for T {
    fn as_reader(&self) -> &dyn StorageReader {
        self
    }
}

/// Check that `name` is a relative, `/`-separated object name.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("empty name")
    } else if name.starts_with('/') || name.contains('\\') {
        Some("names are relative and use '/' separators")
    } else if name.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        Some("empty, '.' or '..' path component")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(Error::invalid_name(name, reason)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("tools/released/juju-1.0.0-ubuntu-amd64.tgz").is_ok());
        assert!(validate_name("a").is_ok());
    }

    #[test]
    fn test_validate_name_rejects() {
        for name in ["", "/abs", "a//b", "a/../b", "./a", "a/", "a\\b"] {
            assert!(
                matches!(validate_name(name), Err(Error::InvalidName { .. })),
                "{name:?} should be rejected"
            );
        }
    }
}
