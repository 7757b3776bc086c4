use crate::{Error, Result, StorageReader};
use std::io::Read;

/// A reader that contains nothing.
///
/// Stands in for a public store when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStorage;

impl StorageReader for EmptyStorage {
    fn get(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        Err(Error::not_found(name))
    }

    fn list(&self, _prefix: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn url(&self, name: &str) -> Result<String> {
        Err(Error::not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_storage() {
        assert!(EmptyStorage.list("").unwrap().is_empty());
        assert!(EmptyStorage.get("x").is_err_and(|e| e.is_not_found()));
        assert!(EmptyStorage.size("x").is_err_and(|e| e.is_not_found()));
    }
}
