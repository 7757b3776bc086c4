//! Classification of listed object names.
//!
//! Both resolvers start from a store listing that may contain unrelated or
//! malformed objects. Each name becomes either a [`Candidate`] or a skip with
//! a [`SkipReason`]; skips never abort a scan.

use super::catalog::FileType;
use super::naming::{LEGACY_PREFIX, decompose, storage_prefix};
use std::fmt;
use tooldist_version::Binary;
use tracing::debug;

/// Which naming scheme a listing follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// `tools/<stream>/juju-<binary>.<tgz|zip>`
    Streamed {
        /// Stream name.
        stream: String,
    },
    /// `tools/juju-<binary>.tgz`
    Legacy,
}

impl Layout {
    /// Streamed layout for `stream`.
    #[must_use]
    pub fn streamed(stream: impl Into<String>) -> Self {
        Self::Streamed {
            stream: stream.into(),
        }
    }

    /// Prefix every bundle in this layout starts with.
    #[must_use]
    pub fn prefix(&self) -> String {
        match self {
            Self::Streamed { stream } => storage_prefix(stream),
            Self::Legacy => LEGACY_PREFIX.to_string(),
        }
    }

    fn accepts(&self, file_type: FileType) -> bool {
        match self {
            Self::Streamed { .. } => true,
            Self::Legacy => file_type == FileType::Tgz,
        }
    }
}

/// Why a listed name was not treated as a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The name lies outside the layout's prefix.
    WrongPrefix,
    /// The name does not end in a suffix the layout accepts.
    UnknownSuffix,
    /// The embedded version failed to parse.
    BadVersion(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongPrefix => f.write_str("wrong prefix"),
            Self::UnknownSuffix => f.write_str("unknown suffix"),
            Self::BadVersion(e) => write!(f, "failed to parse version: {e}"),
        }
    }
}

/// A well-formed bundle name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Object name as listed.
    pub name: String,
    /// Parsed version.
    pub version: Binary,
    /// Archive format from the suffix.
    pub file_type: FileType,
}

/// Outcome for one listed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    /// A bundle.
    Candidate(Candidate),
    /// Not a bundle.
    Skipped {
        /// Object name as listed.
        name: String,
        /// Why it was skipped.
        reason: SkipReason,
    },
}

impl ScanEntry {
    /// Classify one name under `layout`.
    #[must_use]
    pub fn classify(name: &str, layout: &Layout) -> Self {
        let skipped = |reason| Self::Skipped {
            name: name.to_string(),
            reason,
        };
        match decompose(name, &layout.prefix()) {
            Ok((_, file_type)) if !layout.accepts(file_type) => skipped(SkipReason::UnknownSuffix),
            Ok((version, file_type)) => Self::Candidate(Candidate {
                name: name.to_string(),
                version,
                file_type,
            }),
            Err(reason) => skipped(reason),
        }
    }
}

/// Classified listing, in listing order.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    entries: Vec<ScanEntry>,
}

impl ScanReport {
    /// All outcomes in listing order.
    #[must_use]
    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    /// Well-formed bundles in listing order.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter().filter_map(|e| match e {
            ScanEntry::Candidate(c) => Some(c),
            ScanEntry::Skipped { .. } => None,
        })
    }

    /// Skipped names with their reasons.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.entries.iter().filter_map(|e| match e {
            ScanEntry::Skipped { name, reason } => Some((name.as_str(), reason)),
            ScanEntry::Candidate(_) => None,
        })
    }

    /// Whether any listed name was a well-formed bundle, regardless of
    /// version.
    #[must_use]
    pub fn found_any(&self) -> bool {
        self.candidates().next().is_some()
    }
}

/// Classify every name in a listing.
///
/// Skips are logged at debug level.
pub fn scan<I, S>(names: I, layout: &Layout) -> ScanReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let entries: Vec<ScanEntry> = names
        .into_iter()
        .map(|name| ScanEntry::classify(name.as_ref(), layout))
        .collect();
    let report = ScanReport { entries };

    let mut skipped = 0usize;
    for (name, reason) in report.skipped() {
        debug!(name, %reason, "Skipping unexpected tools file");
        skipped += 1;
    }
    debug!(
        total = report.entries.len(),
        skipped,
        "Scanned tools listing"
    );
    report
}
