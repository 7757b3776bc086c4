//! Catalog entries describing fetchable bundles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tooldist_version::{Binary, Platform};

const WINDOWS: &str = "windows";

/// Archive format of a bundle, inferred from its object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Gzip-compressed tar.
    Tgz,
    /// Zip archive.
    Zip,
}

impl FileType {
    /// Both recognized formats.
    pub const ALL: [Self; 2] = [Self::Tgz, Self::Zip];

    /// Name used in JSON and object suffixes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tgz => "tgz",
            Self::Zip => "zip",
        }
    }

    /// Object name suffix, including the dot.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Tgz => ".tgz",
            Self::Zip => ".zip",
        }
    }

    /// Format a bundle for `version` is published in: zip for Windows from
    /// 1.26 on, tgz for everything else.
    #[must_use]
    pub fn for_binary(version: &Binary) -> Self {
        if version.os == WINDOWS && (version.major(), version.minor()) >= (1, 26) {
            Self::Zip
        } else {
            Self::Tgz
        }
    }

    /// The file type whose suffix ends `name`, if any.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| name.ends_with(t.suffix()))
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The location and version of one tools bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tools {
    /// Object name the bundle is stored under. Not part of the JSON form, so
    /// it is empty for entries read back from JSON.
    #[serde(skip)]
    pub name: String,
    /// Version, OS and architecture of the bundle.
    pub version: Binary,
    /// Address the bundle can be fetched from.
    pub url: String,
    /// Hex SHA-256 of the bundle; empty when the producer did not record one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sha256: String,
    /// Size of the bundle in bytes.
    pub size: u64,
    /// Archive format.
    #[serde(rename = "filetype")]
    pub file_type: FileType,
}

/// An ordered list of catalog entries.
///
/// Order is whatever the producer gave, which for the resolver is the store
/// listing order. Use [`ToolsList::newest`] to pick by version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolsList(Vec<Tools>);

impl ToolsList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, tools: Tools) {
        self.0.push(tools);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tools> {
        self.0.iter()
    }

    /// Entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Tools] {
        &self.0
    }

    /// Distinct architectures, sorted.
    #[must_use]
    pub fn arches(&self) -> Vec<String> {
        self.distinct(|t| &t.version.arch)
    }

    /// Distinct operating systems, sorted.
    #[must_use]
    pub fn oses(&self) -> Vec<String> {
        self.distinct(|t| &t.version.os)
    }

    fn distinct(&self, field: impl Fn(&Tools) -> &String) -> Vec<String> {
        self.0
            .iter()
            .map(field)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Entries built for `platform`, in order.
    #[must_use]
    pub fn for_platform(&self, platform: &Platform) -> Self {
        self.0
            .iter()
            .filter(|t| t.version.os == platform.os && t.version.arch == platform.arch)
            .cloned()
            .collect()
    }

    /// The highest version number present and every entry carrying it.
    ///
    /// Entries keep their relative order. Returns `None` for an empty list.
    #[must_use]
    pub fn newest(&self) -> Option<(tooldist_version::Number, Self)> {
        let best = self.0.iter().map(|t| t.version.number).max()?;
        let entries = self
            .0
            .iter()
            .filter(|t| t.version.number == best)
            .cloned()
            .collect();
        Some((best, entries))
    }
}

impl FromIterator<Tools> for ToolsList {
    fn from_iter<I: IntoIterator<Item = Tools>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ToolsList {
    type Item = Tools;
    type IntoIter = std::vec::IntoIter<Tools>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ToolsList {
    type Item = &'a Tools;
    type IntoIter = std::slice::Iter<'a, Tools>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
