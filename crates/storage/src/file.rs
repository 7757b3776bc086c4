//! Directory-backed blob store.
//!
//! Object `a/b/c` lives at `{root}/a/b/c`. Writes go to a uniquely named
//! sibling temporary file that is persisted into place, so readers never
//! observe a partially written object.

use crate::{Error, Result, StorageReader, StorageWriter, validate_name};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// A blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a store rooted at `root`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl StorageReader for FileStorage {
    fn get(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        let path = self.object_path(name)?;
        match File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::not_found(name)),
            Err(e) => Err(Error::io(e, path, "open")),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf);
                Error::Io {
                    source: e.into(),
                    path,
                    operation: "list".into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let Some(name) = object_name(relative) else {
                trace!(path = %entry.path().display(), "Skipping unaddressable file");
                continue;
            };
            if name.starts_with(prefix) {
                names.push(name);
            }
        }
        names.sort();
        trace!(prefix, count = names.len(), "Listed objects");
        Ok(names)
    }

    fn url(&self, name: &str) -> Result<String> {
        let path = self.object_path(name)?;
        Ok(format!("file://{}", path.display()))
    }

    fn size(&self, name: &str) -> Result<u64> {
        let path = self.object_path(name)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::not_found(name)),
            Err(e) => Err(Error::io(e, path, "metadata")),
        }
    }
}

impl StorageWriter for FileStorage {
    fn put(&self, name: &str, r: &mut dyn Read, length: u64) -> Result<()> {
        let path = self.object_path(name)?;
        let parent = path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create_dir_all"))?;

        let mut staged = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(parent)
            .map_err(|e| Error::io(e, parent, "create"))?;
        let actual = write_temp(&mut staged, r)?;
        if actual != length {
            return Err(Error::LengthMismatch {
                name: name.to_string(),
                expected: length,
                actual,
            });
        }

        staged
            .persist(&path)
            .map_err(|e| Error::io(e.error, &path, "persist"))?;
        debug!(name, size = actual, "Stored object");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.object_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(e, path, "remove")),
        }
    }
}

/// Prefix of in-flight staging files; never listed.
const TEMP_PREFIX: &str = ".tooldist-put-";

/// The object name for a path relative to the root, if the store can address
/// it again. Non-UTF-8 names, names that fail validation and staging files are
/// left out.
fn object_name(relative: &Path) -> Option<String> {
    let components = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    if components.last()?.starts_with(TEMP_PREFIX) {
        return None;
    }
    let name = components.join("/");
    validate_name(&name).ok()?;
    Some(name)
}

fn write_temp(staged: &mut NamedTempFile, r: &mut dyn Read) -> Result<u64> {
    let path = staged.path().to_path_buf();
    let file = staged.as_file_mut();
    let n = io::copy(r, file).map_err(|e| Error::io(e, &path, "write"))?;
    file.flush().map_err(|e| Error::io(e, &path, "flush"))?;
    file.sync_all().map_err(|e| Error::io(e, &path, "sync"))?;
    Ok(n)
}
