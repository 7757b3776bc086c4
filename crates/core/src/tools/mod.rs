//! Tool bundles: naming, packaging, resolution and extraction.
//!
//! Write path: [`archive()`] → [`put_tools`] → store.
//! Read path: store → [`scan()`] → [`read_list`] / [`find_best`] → [`extract`].

mod archive;
mod catalog;
mod environ;
mod fetch;
mod naming;
mod resolve;
mod scan;
mod upload;

pub use archive::{BUNDLE_MODE, BUNDLE_OWNER, archive, archive_as, archive_zip};
pub use catalog::{FileType, Tools, ToolsList};
pub use environ::{Environ, StorageEnviron};
pub use fetch::{extract, fetch_tools, get_tools, validate_entry_name};
pub use naming::{
    LEGACY_PREFIX, SUFFIX_LEN, decompose, legacy_storage_name, storage_name, storage_prefix,
};
pub use resolve::{
    BestMatch, FoundTools, VersionFilter, find_best, find_tools, find_tools_url, read_list,
};
pub use scan::{Candidate, Layout, ScanEntry, ScanReport, SkipReason, scan};
pub use upload::{put_legacy_tools, put_tools};
