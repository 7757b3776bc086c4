//! Version resolution over a store listing.
//!
//! Two policies share the [`scan`](super::scan()) primitive:
//! - [`read_list`]: every bundle in a stream matching a major(.minor) version,
//!   across all platforms
//! - [`find_best`]: the single highest legacy bundle for one platform

use super::catalog::{Tools, ToolsList};
use super::environ::Environ;
use super::naming::LEGACY_PREFIX;
use super::scan::{Layout, scan};
use crate::{Error, Result};
use tooldist_storage::StorageReader;
use tooldist_version::{Binary, Platform, arch};
use tracing::{debug, warn};

/// Which versions a listing query accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionFilter {
    /// Required major version.
    pub major: u32,
    /// Required minor version; `None` accepts any.
    pub minor: Option<u32>,
}

impl VersionFilter {
    /// Accept every minor version under `major`.
    #[must_use]
    pub const fn major(major: u32) -> Self {
        Self { major, minor: None }
    }

    /// Accept exactly `major.minor`.
    #[must_use]
    pub const fn exact(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor: Some(minor),
        }
    }

    /// Build a filter from the sentinel form where a negative minor means
    /// "any".
    #[must_use]
    pub fn from_raw(major: u32, minor: i64) -> Self {
        Self {
            major,
            minor: u32::try_from(minor).ok(),
        }
    }

    /// Whether `version` passes the filter.
    #[must_use]
    pub fn matches(&self, version: &Binary) -> bool {
        version.major() == self.major && self.minor.is_none_or(|minor| version.minor() == minor)
    }
}

/// Read every bundle in `stream` that passes `filter`.
///
/// Entries are returned in store listing order. Each `ppc64el` entry is
/// followed by a copy tagged with the legacy `ppc64` architecture, which keeps
/// the object name of the entry it copies.
///
/// # Errors
///
/// - [`Error::NoMatches`] if well-formed bundles exist but none pass the filter
/// - [`Error::NoTools`] if the listing holds no well-formed bundles at all
/// - [`Error::Storage`] if listing, sizing or URL resolution fails
pub fn read_list(store: &dyn StorageReader, stream: &str, filter: VersionFilter) -> Result<ToolsList> {
    match filter.minor {
        Some(minor) => debug!("reading v{}.{} tools", filter.major, minor),
        None => debug!("reading v{}.* tools", filter.major),
    }
    let layout = Layout::streamed(stream);
    let names = store.list(&layout.prefix())?;
    let report = scan(&names, &layout);

    let mut list = ToolsList::new();
    for candidate in report.candidates() {
        if !filter.matches(&candidate.version) {
            continue;
        }
        debug!(version = %candidate.version, "found tools");
        let tools = Tools {
            name: candidate.name.clone(),
            version: candidate.version.clone(),
            url: store.url(&candidate.name)?,
            sha256: String::new(),
            size: store.size(&candidate.name)?,
            file_type: candidate.file_type,
        };
        let legacy = (tools.version.arch == arch::PPC64EL).then(|| {
            let mut legacy = tools.clone();
            legacy.version.arch = arch::LEGACY_PPC64.to_string();
            legacy
        });
        list.push(tools);
        if let Some(legacy) = legacy {
            list.push(legacy);
        }
    }

    if list.is_empty() {
        if report.found_any() {
            return Err(Error::NoMatches);
        }
        return Err(Error::NoTools);
    }
    Ok(list)
}

/// The single best legacy bundle found by [`find_best`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMatch {
    /// Object name in the store.
    pub name: String,
    /// Parsed version.
    pub version: Binary,
}

/// Find the highest legacy bundle for `platform` with major version `major`.
///
/// Ties keep the first entry seen in listing order.
///
/// # Errors
///
/// - [`Error::NoTools`] if nothing is listed under the major-version prefix
/// - [`Error::NoMatches`] if entries exist but none fit platform and major
pub fn find_best(store: &dyn StorageReader, platform: &Platform, major: u32) -> Result<BestMatch> {
    let names = store.list(&format!("{LEGACY_PREFIX}{major}."))?;
    if names.is_empty() {
        return Err(Error::NoTools);
    }

    let report = scan(&names, &Layout::Legacy);
    let mut best: Option<BestMatch> = None;
    for candidate in report.candidates() {
        let v = &candidate.version;
        if v.os != platform.os || v.arch != platform.arch || v.major() != major {
            continue;
        }
        if best.as_ref().is_none_or(|b| b.version.number < v.number) {
            best = Some(BestMatch {
                name: candidate.name.clone(),
                version: v.clone(),
            });
        }
    }
    best.ok_or(Error::NoMatches)
}

/// A legacy bundle and the store it was found in.
pub struct FoundTools<'a> {
    /// Store holding the bundle.
    pub storage: &'a dyn StorageReader,
    /// The bundle.
    pub best: BestMatch,
    /// Whether the bundle came from the public store.
    pub public: bool,
}

impl std::fmt::Debug for FoundTools<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoundTools")
            .field("best", &self.best)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Search the environ's private store, then its public store.
///
/// The public store is consulted only when the private search reports that
/// nothing suitable exists (no tools, no matches, or a missing object); other
/// failures are returned as-is.
///
/// # Errors
///
/// Returns the public store's error when both searches fail.
pub fn find_tools<'a>(env: &'a dyn Environ, platform: &Platform, major: u32) -> Result<FoundTools<'a>> {
    let private = env.storage().as_reader();
    match find_best(private, platform, major) {
        Ok(best) => {
            return Ok(FoundTools {
                storage: private,
                best,
                public: false,
            });
        }
        Err(e) if e.is_no_tools() || e.is_no_matches() || e.is_not_found() => {
            warn!(error = %e, "No suitable tools in private storage, trying public storage");
        }
        Err(e) => return Err(e),
    }

    let public = env.public_storage();
    let best = find_best(public, platform, major)?;
    Ok(FoundTools {
        storage: public,
        best,
        public: true,
    })
}

/// URL of the best legacy bundle for `platform`, searched as in
/// [`find_tools`].
///
/// # Errors
///
/// Fails as [`find_tools`] does, or if the store cannot resolve a URL.
pub fn find_tools_url(env: &dyn Environ, platform: &Platform, major: u32) -> Result<String> {
    let found = find_tools(env, platform, major)?;
    Ok(found.storage.url(&found.best.name)?)
}
