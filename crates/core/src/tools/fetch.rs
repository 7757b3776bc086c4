//! Bundle download and extraction.

use super::archive::BUNDLE_MODE;
use super::catalog::{FileType, Tools};
use super::environ::Environ;
use super::naming::storage_name;
use super::resolve::find_tools;
use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::Path;
use tar::{Archive, EntryType};
use tooldist_storage::StorageReader;
use tooldist_version::{Binary, Platform};
use tracing::{debug, info, trace};

/// Check that an archive entry name denotes a file directly inside the
/// destination directory.
///
/// Bundles are flat, so any separator is refused. That covers `a/../b`,
/// absolute names and the `/\` sequence alike.
///
/// # Errors
///
/// Returns [`Error::BadEntryName`] for empty names, `.`, `..`, or names
/// containing `/` or `\`.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::bad_entry_name(name));
    }
    Ok(())
}

/// Unpack a bundle read from `reader` into `dest`.
///
/// `dest` is created if missing. Each entry's name is validated before the
/// entry is written, and files get the archived permission bits. Entries
/// written before a failure are left in place.
///
/// # Errors
///
/// - [`Error::BadEntryName`] for unsafe names and for entries that are not
///   regular files
/// - [`Error::Extract`] if writing an entry fails
/// - [`Error::Io`] if the archive stream itself cannot be read
pub fn extract(reader: impl Read, file_type: FileType, dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest).map_err(|e| Error::io(e, dest, "create_dir_all"))?;
    let count = match file_type {
        FileType::Tgz => extract_tgz(reader, dest)?,
        FileType::Zip => extract_zip(reader, dest)?,
    };
    debug!(dest = %dest.display(), files = count, file_type = %file_type.as_str(), "Extracted bundle");
    Ok(count)
}

fn extract_tgz(reader: impl Read, dest: &Path) -> Result<usize> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    let mut count = 0;
    for entry in archive
        .entries()
        .map_err(|e| Error::io_op(e, "read tar stream"))?
    {
        let mut entry = entry.map_err(|e| Error::io_op(e, "read tar entry"))?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        validate_entry_name(&name)?;
        if entry.header().entry_type() != EntryType::Regular {
            return Err(Error::bad_entry_name(name));
        }
        let mode = entry.header().mode().unwrap_or(BUNDLE_MODE);
        write_entry(&mut entry, &dest.join(&name), mode)?;
        trace!(name, mode = %format!("{mode:o}"), "Extracted entry");
        count += 1;
    }
    Ok(count)
}

fn extract_zip(mut reader: impl Read, dest: &Path) -> Result<usize> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| Error::io_op(e, "read zip stream"))?;
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| Error::io_op(io::Error::other(e), "open zip"))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::io_op(io::Error::other(e), "read zip entry"))?;
        let name = file.name().to_string();
        validate_entry_name(&name)?;
        if !file.is_file() {
            return Err(Error::bad_entry_name(name));
        }
        let mode = file.unix_mode().unwrap_or(BUNDLE_MODE);
        write_entry(&mut file, &dest.join(&name), mode)?;
        trace!(name, mode = %format!("{mode:o}"), "Extracted entry");
    }
    Ok(archive.len())
}

fn write_entry(r: &mut impl Read, path: &Path, mode: u32) -> Result<()> {
    let extract_err = |source| Error::Extract {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(extract_err)?;
    io::copy(r, &mut file).map_err(extract_err)?;
    set_mode(&file, mode).map_err(extract_err)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode & 0o777))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Find the best legacy bundle for `platform` and unpack it into `dest`.
///
/// Returns the version that was unpacked.
///
/// # Errors
///
/// Fails as [`find_tools`] or [`extract`] do, or if the bundle cannot be read
/// from its store.
pub fn get_tools(env: &dyn Environ, platform: &Platform, major: u32, dest: &Path) -> Result<Binary> {
    let found = find_tools(env, platform, major)?;
    info!(
        version = %found.best.version,
        public = found.public,
        dest = %dest.display(),
        "Fetching tools"
    );
    let reader = found.storage.get(&found.best.name)?;
    extract(reader, FileType::Tgz, dest)?;
    Ok(found.best.version)
}

/// Unpack the streamed bundle described by `tools` from `store` into `dest`.
///
/// The bundle is read from the object name it was listed under. Entries
/// without one (read back from JSON) fall back to the canonical name for
/// `stream`.
///
/// # Errors
///
/// Fails if the object is missing from `store` or [`extract`] fails.
pub fn fetch_tools(store: &dyn StorageReader, stream: &str, tools: &Tools, dest: &Path) -> Result<usize> {
    let name = if tools.name.is_empty() {
        storage_name(stream, &tools.version, tools.file_type)
    } else {
        tools.name.clone()
    };
    info!(name, dest = %dest.display(), "Fetching tools");
    let reader = store.get(&name)?;
    extract(reader, tools.file_type, dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{VersionFilter, read_list};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tar::{Builder, Header};
    use tempfile::TempDir;
    use tooldist_storage::MemoryStorage;

    /// Build a tgz, writing names straight into the header so unsafe names
    /// survive.
    fn tgz(entries: &[(&str, EntryType, &[u8], u32)]) -> Vec<u8> {
        let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (name, kind, content, mode) in entries {
            let mut header = Header::new_gnu();
            {
                let raw = &mut header.as_gnu_mut().unwrap().name;
                raw[..name.len()].copy_from_slice(name.as_bytes());
            }
            header.set_entry_type(*kind);
            header.set_size(content.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append(&header, *content).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            let options = zip::write::SimpleFileOptions::default().unix_permissions(0o750);
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_validate_entry_name() {
        for good in ["jujud", "juju.exe", "a..b"] {
            validate_entry_name(good).unwrap();
        }
        for bad in ["", ".", "..", "../evil", "/etc/passwd", "a/b", "a\\b", "a/\\b"] {
            let err = validate_entry_name(bad).unwrap_err();
            assert!(matches!(err, Error::BadEntryName { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_extract_tgz() {
        let dest = TempDir::new().unwrap();
        let data = tgz(&[
            ("jujud", EntryType::Regular, b"daemon", 0o755),
            ("juju", EntryType::Regular, b"client", 0o700),
        ]);

        let count = extract(&data[..], FileType::Tgz, dest.path()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(dest.path().join("jujud")).unwrap(), "daemon");
        assert_eq!(fs::read_to_string(dest.path().join("juju")).unwrap(), "client");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dest.path().join("juju")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn test_extract_creates_dest() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a/b");
        let data = tgz(&[("jujud", EntryType::Regular, b"x", 0o755)]);
        extract(&data[..], FileType::Tgz, &dest).unwrap();
        assert!(dest.join("jujud").is_file());
    }

    #[test]
    fn test_extract_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        let data = tgz(&[("../evil", EntryType::Regular, b"x", 0o755)]);

        let err = extract(&data[..], FileType::Tgz, &dest).unwrap_err();
        match err {
            Error::BadEntryName { name } => assert_eq!(name, "../evil"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!temp.path().join("evil").exists());
    }

    #[test]
    fn test_extract_rejects_slash_backslash() {
        let dest = TempDir::new().unwrap();
        let data = tgz(&[("a/\\b", EntryType::Regular, b"x", 0o755)]);
        let err = extract(&data[..], FileType::Tgz, dest.path()).unwrap_err();
        assert!(matches!(err, Error::BadEntryName { .. }));
    }

    #[test]
    fn test_extract_rejects_directory_entry() {
        let dest = TempDir::new().unwrap();
        let data = tgz(&[("bin", EntryType::Directory, b"", 0o755)]);
        let err = extract(&data[..], FileType::Tgz, dest.path()).unwrap_err();
        assert!(matches!(err, Error::BadEntryName { .. }));
    }

    #[test]
    fn test_extract_garbage_is_io_error() {
        let dest = TempDir::new().unwrap();
        let err = extract(&b"not a tarball"[..], FileType::Tgz, dest.path()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "got {err:?}");
    }

    #[test]
    fn test_extract_zip() {
        let dest = TempDir::new().unwrap();
        let data = zip_bytes(&[("juju.exe", b"win")]);

        let count = extract(&data[..], FileType::Zip, dest.path()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(fs::read_to_string(dest.path().join("juju.exe")).unwrap(), "win");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dest.path().join("juju.exe")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o750);
        }
    }

    fn store_bundle(store: &MemoryStorage, name: &str) {
        store.insert(name, tgz(&[("jujud", EntryType::Regular, b"daemon", 0o755)]));
    }

    #[test]
    fn test_fetch_tools_ppc64_alias() {
        let store = MemoryStorage::new();
        store_bundle(&store, "tools/released/juju-2.0.0-ubuntu-ppc64el.tgz");

        let list = read_list(&store, "released", VersionFilter::major(2)).unwrap();
        let alias = list.for_platform(&Platform::new("ubuntu", "ppc64"));
        assert_eq!(alias.len(), 1);

        let dest = TempDir::new().unwrap();
        let count = fetch_tools(&store, "released", &alias.as_slice()[0], dest.path()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(fs::read_to_string(dest.path().join("jujud")).unwrap(), "daemon");
    }

    #[test]
    fn test_fetch_tools_non_canonical_name() {
        let store = MemoryStorage::new();
        store_bundle(&store, "tools/released/juju-2.01.0-ubuntu-amd64.tgz");

        let list = read_list(&store, "released", VersionFilter::exact(2, 1)).unwrap();
        let tools = &list.as_slice()[0];
        assert_eq!(tools.version.to_string(), "2.1.0-ubuntu-amd64");

        let dest = TempDir::new().unwrap();
        fetch_tools(&store, "released", tools, dest.path()).unwrap();
        assert!(dest.path().join("jujud").is_file());
    }

    #[test]
    fn test_fetch_tools_without_name_uses_stream() {
        let store = MemoryStorage::new();
        store_bundle(&store, "tools/devel/juju-2.0.0-ubuntu-amd64.tgz");
        let tools: Tools = serde_json::from_str(
            r#"{"version":"2.0.0-ubuntu-amd64","url":"u","size":1,"filetype":"tgz"}"#,
        )
        .unwrap();

        let dest = TempDir::new().unwrap();
        fetch_tools(&store, "devel", &tools, dest.path()).unwrap();
        assert!(dest.path().join("jujud").is_file());
    }

    #[test]
    fn test_extract_zip_rejects_nested() {
        let dest = TempDir::new().unwrap();
        let data = zip_bytes(&[("bin/juju.exe", b"win")]);
        let err = extract(&data[..], FileType::Zip, dest.path()).unwrap_err();
        assert!(matches!(err, Error::BadEntryName { .. }));
    }
}
