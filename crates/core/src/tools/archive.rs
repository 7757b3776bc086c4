//! Bundle creation.
//!
//! A bundle is an archive of the executables found directly in one directory,
//! either a gzip-compressed tar or a zip. Entry metadata is normalized so the
//! bundle unpacks the same way on every receiving machine.

use super::catalog::FileType;
use crate::{Error, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File, Metadata};
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tar::{Builder, EntryType, Header};
use tracing::{debug, trace};
use zip::write::SimpleFileOptions;

/// Mode of every archived entry, regardless of the source file's mode.
pub const BUNDLE_MODE: u32 = 0o755;

/// User and group name recorded for every archived entry.
pub const BUNDLE_OWNER: &str = "ubuntu";

struct BundleEntry {
    path: PathBuf,
    name: String,
    metadata: Metadata,
}

/// The files of `dir` in name order, all checked before anything is written.
fn bundle_entries(dir: &Path) -> Result<Vec<BundleEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::io(e, dir, "read_dir"))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| Error::io(e, dir, "read_dir"))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    entries
        .into_iter()
        .map(|entry| {
            let path = entry.path();
            // DirEntry::metadata does not traverse symlinks
            let metadata = entry
                .metadata()
                .map_err(|e| Error::io(e, &path, "stat"))?;
            if !is_executable(&metadata) {
                return Err(Error::archive(path));
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            Ok(BundleEntry { path, name, metadata })
        })
        .collect()
}

/// Write the executables in `dir` to `w` as a gzipped tar.
///
/// Entries are added in file name order. Names longer than a tar header holds
/// get GNU long-name records. The tar trailer is written before the gzip
/// trailer, and `w` is handed back once both are complete.
///
/// # Errors
///
/// Returns [`Error::Archive`] naming the first entry of `dir` that is not a
/// regular file with the owner execute bit set; symlinks are not followed.
/// Nothing is written in that case. I/O failures after writing has started
/// leave partial output in `w`, so callers must discard it.
pub fn archive<W: Write>(w: W, dir: &Path) -> Result<W> {
    let entries = bundle_entries(dir)?;
    let mut builder = Builder::new(GzEncoder::new(w, Compression::default()));

    for entry in &entries {
        let mut header = tar_header(&entry.metadata).map_err(|e| Error::io(e, &entry.path, "tar header"))?;
        let file = File::open(&entry.path).map_err(|e| Error::io(e, &entry.path, "open"))?;
        builder
            .append_data(&mut header, &entry.name, file)
            .map_err(|e| Error::io(e, &entry.path, "tar append"))?;
        trace!(path = %entry.path.display(), size = entry.metadata.len(), "Archived file");
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| Error::io_op(e, "finish tar stream"))?;
    let w = encoder
        .finish()
        .map_err(|e| Error::io_op(e, "finish gzip stream"))?;
    debug!(dir = %dir.display(), files = entries.len(), "Archived tools directory");
    Ok(w)
}

/// Write the executables in `dir` to `w` as a zip, each stored with mode
/// [`BUNDLE_MODE`].
///
/// # Errors
///
/// Fails as [`archive`] does.
pub fn archive_zip<W: Write + Seek>(w: W, dir: &Path) -> Result<W> {
    let entries = bundle_entries(dir)?;
    let mut writer = zip::ZipWriter::new(w);
    let options = SimpleFileOptions::default().unix_permissions(BUNDLE_MODE);

    for entry in &entries {
        writer
            .start_file(entry.name.as_str(), options)
            .map_err(|e| Error::io(io::Error::other(e), &entry.path, "zip entry"))?;
        let mut file = File::open(&entry.path).map_err(|e| Error::io(e, &entry.path, "open"))?;
        io::copy(&mut file, &mut writer).map_err(|e| Error::io(e, &entry.path, "zip append"))?;
        trace!(path = %entry.path.display(), size = entry.metadata.len(), "Archived file");
    }

    let w = writer
        .finish()
        .map_err(|e| Error::io_op(io::Error::other(e), "finish zip stream"))?;
    debug!(dir = %dir.display(), files = entries.len(), "Archived tools directory as zip");
    Ok(w)
}

/// Archive `dir` into `w` in the given format.
///
/// # Errors
///
/// Fails as [`archive`] does.
pub fn archive_as<W: Write + Seek>(w: W, dir: &Path, file_type: FileType) -> Result<W> {
    match file_type {
        FileType::Tgz => archive(w, dir),
        FileType::Zip => archive_zip(w, dir),
    }
}

/// Whether `metadata` describes a regular file executable by its owner.
fn is_executable(metadata: &Metadata) -> bool {
    if !metadata.file_type().is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o100 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Tar header for a bundle entry, without its path.
///
/// All three timestamps are set to the source modification time.
fn tar_header(metadata: &Metadata) -> io::Result<Header> {
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs());

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(metadata.len());
    header.set_mode(BUNDLE_MODE);
    header.set_mtime(mtime);
    header.set_username(BUNDLE_OWNER)?;
    header.set_groupname(BUNDLE_OWNER)?;
    if let Some(gnu) = header.as_gnu_mut() {
        gnu.set_atime(mtime);
        gnu.set_ctime(mtime);
    }
    Ok(header)
}
