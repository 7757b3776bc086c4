//! Uploading bundles into a store.

use super::archive::archive_as;
use super::catalog::{FileType, Tools};
use super::naming::{legacy_storage_name, storage_name};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::Path;
use tooldist_storage::Storage;
use tooldist_version::Binary;
use tracing::info;

/// Archive `dir` and store it as the `version` bundle of `stream`.
///
/// The format follows [`FileType::for_binary`]. The bundle is staged in a
/// temporary file so its length is known before the upload starts. The
/// temporary file is removed on every exit path.
///
/// # Errors
///
/// Fails with [`Error::Version`] if `version` has an OS or architecture that
/// could not be read back from the object name, if archiving fails (see
/// [`archive`](super::archive())), if the temporary file cannot be written or
/// read back, or if the store rejects the upload.
pub fn put_tools(storage: &dyn Storage, dir: &Path, stream: &str, version: &Binary) -> Result<Tools> {
    let file_type = FileType::for_binary(version);
    let name = storage_name(stream, version, file_type);
    upload(storage, dir, &name, version, file_type)
}

/// Archive `dir` and store it under the flat pre-stream name for `version`.
///
/// # Errors
///
/// Fails as [`put_tools`] does.
pub fn put_legacy_tools(storage: &dyn Storage, dir: &Path, version: &Binary) -> Result<Tools> {
    let name = legacy_storage_name(version);
    upload(storage, dir, &name, version, FileType::Tgz)
}

fn upload(
    storage: &dyn Storage,
    dir: &Path,
    name: &str,
    version: &Binary,
    file_type: FileType,
) -> Result<Tools> {
    version.validate()?;
    let mut staged = tempfile::Builder::new()
        .prefix(&format!("juju-{file_type}"))
        .tempfile()
        .map_err(|e| Error::io_op(e, "create staging file"))?;
    let staged_path = staged.path().to_path_buf();

    let file = archive_as(staged.as_file_mut(), dir, file_type)?;
    file.sync_all()
        .map_err(|e| Error::io(e, &staged_path, "sync"))?;

    let size = file
        .metadata()
        .map_err(|e| Error::io(e, &staged_path, "metadata"))?
        .len();
    let sha256 = sha256_of(file).map_err(|e| Error::io(e, &staged_path, "hash"))?;
    file.seek(SeekFrom::Start(0))
        .map_err(|e| Error::io(e, &staged_path, "seek"))?;

    info!(name, size, file_type = %file_type, "Uploading tools");
    storage.put(name, file, size)?;

    Ok(Tools {
        name: name.to_string(),
        version: version.clone(),
        url: storage.url(name)?,
        sha256,
        size,
        file_type,
    })
}

fn sha256_of(file: &mut File) -> io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut hasher = Sha256::new();
    io::copy(file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{VersionFilter, read_list};
    use std::io::Read;
    use tempfile::TempDir;
    use tooldist_storage::{MemoryStorage, StorageReader};

    #[cfg(unix)]
    fn tools_dir() -> TempDir {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jujud");
        std::fs::write(&path, "daemon").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        temp
    }

    #[cfg(unix)]
    #[test]
    fn test_put_tools_names_and_hashes() {
        let dir = tools_dir();
        let store = MemoryStorage::new();
        let version = Binary::parse("2.0.0-ubuntu-amd64").unwrap();

        let tools = put_tools(&store, dir.path(), "released", &version).unwrap();

        let name = "tools/released/juju-2.0.0-ubuntu-amd64.tgz";
        assert_eq!(store.list("").unwrap(), vec![name]);
        assert_eq!(tools.url, format!("mem://{name}"));
        assert_eq!(tools.file_type, FileType::Tgz);
        assert_eq!(tools.size, store.size(name).unwrap());
        assert!(tools.size > 0);

        let mut data = Vec::new();
        store.get(name).unwrap().read_to_end(&mut data).unwrap();
        assert_eq!(tools.sha256, hex::encode(Sha256::digest(&data)));
    }

    #[cfg(unix)]
    #[test]
    fn test_put_tools_is_listed() {
        let dir = tools_dir();
        let store = MemoryStorage::new();
        let version = Binary::parse("2.1.3-ubuntu-arm64").unwrap();
        put_tools(&store, dir.path(), "devel", &version).unwrap();

        let list = read_list(&store, "devel", VersionFilter::exact(2, 1)).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].version, version);
    }

    #[cfg(unix)]
    #[test]
    fn test_put_legacy_tools() {
        let dir = tools_dir();
        let store = MemoryStorage::new();
        let version = Binary::parse("1.10.0-precise-amd64").unwrap();
        put_legacy_tools(&store, dir.path(), &version).unwrap();
        assert_eq!(
            store.list("tools/").unwrap(),
            vec!["tools/juju-1.10.0-precise-amd64.tgz"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_put_tools_windows_zip() {
        let dir = tools_dir();
        let store = MemoryStorage::new();
        let version = Binary::parse("1.26.0-windows-amd64").unwrap();

        let tools = put_tools(&store, dir.path(), "released", &version).unwrap();
        assert_eq!(tools.file_type, FileType::Zip);
        assert_eq!(tools.name, "tools/released/juju-1.26.0-windows-amd64.zip");
        assert_eq!(store.list("").unwrap(), vec![tools.name.clone()]);

        let dest = TempDir::new().unwrap();
        let list = read_list(&store, "released", VersionFilter::exact(1, 26)).unwrap();
        let count = crate::tools::fetch_tools(&store, "released", &list.as_slice()[0], dest.path()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(std::fs::read_to_string(dest.path().join("jujud")).unwrap(), "daemon");
    }

    #[cfg(unix)]
    #[test]
    fn test_put_tools_older_windows_is_tgz() {
        let dir = tools_dir();
        let store = MemoryStorage::new();
        let version = Binary::parse("1.25.0-windows-amd64").unwrap();
        let tools = put_tools(&store, dir.path(), "released", &version).unwrap();
        assert_eq!(tools.file_type, FileType::Tgz);
    }

    #[cfg(unix)]
    #[test]
    fn test_put_tools_rejects_unparseable_version() {
        let dir = tools_dir();
        let store = MemoryStorage::new();
        let version = Binary::new(tooldist_version::Number::new(2, 0, 0), "ubuntu-focal", "amd64");

        let err = put_tools(&store, dir.path(), "released", &version).unwrap_err();
        assert!(matches!(err, Error::Version(_)), "got {err:?}");
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_tools_archive_failure_stores_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let store = MemoryStorage::new();
        let version = Binary::parse("2.0.0-ubuntu-amd64").unwrap();

        let err = put_tools(&store, dir.path(), "released", &version).unwrap_err();
        assert!(matches!(err, Error::Archive { .. }));
        assert!(store.is_empty());
    }
}
