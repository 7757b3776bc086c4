//! In-memory blob store.

use crate::{Error, Result, StorageReader, StorageWriter, validate_name};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, PoisonError, RwLock};

/// A blob store that keeps every object in memory.
///
/// Clones share the same contents. URLs have the form `mem://<name>`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<BTreeMap<String, Arc<Vec<u8>>>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `data` under `name` directly.
    ///
    /// Unlike [`StorageWriter::put`], the name is not validated, so tests can
    /// seed a store with arbitrary junk.
    pub fn insert(&self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::new(data.into()));
    }
}

impl StorageReader for MemoryStorage {
    fn get(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let data = objects.get(name).ok_or_else(|| Error::not_found(name))?;
        Ok(Box::new(Cursor::new(data.as_ref().clone())))
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn url(&self, name: &str) -> Result<String> {
        Ok(format!("mem://{name}"))
    }

    fn size(&self, name: &str) -> Result<u64> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let data = objects.get(name).ok_or_else(|| Error::not_found(name))?;
        Ok(data.len() as u64)
    }
}

impl StorageWriter for MemoryStorage {
    fn put(&self, name: &str, r: &mut dyn Read, length: u64) -> Result<()> {
        validate_name(name)?;
        let mut data = Vec::new();
        r.read_to_end(&mut data).map_err(|e| Error::Io {
            source: e,
            path: None,
            operation: format!("read content for {name:?}"),
        })?;
        let actual = data.len() as u64;
        if actual != length {
            return Err(Error::LengthMismatch {
                name: name.to_string(),
                expected: length,
                actual,
            });
        }
        self.insert(name, data);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        Ok(())
    }
}
