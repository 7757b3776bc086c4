//! Platform detection and parsing.
//!
//! Handles mapping between Rust's target names (`linux`, `x86_64`) and the
//! OS/architecture tags used in bundle names (`ubuntu`, `amd64`).

use crate::arch;
use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An OS/architecture pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system, or OS series for legacy bundles.
    pub os: String,
    /// Architecture tag.
    pub arch: String,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the host platform.
    #[must_use]
    pub fn current() -> Self {
        Self::new(
            normalize_os(std::env::consts::OS),
            arch::normalize(std::env::consts::ARCH),
        )
    }

    /// Parse an `os-arch` string (e.g. "ubuntu-amd64").
    ///
    /// The architecture is normalized, so "linux-x86_64" parses to
    /// `ubuntu`/`amd64`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPlatform`] unless the string has exactly
    /// two non-empty `-`-separated parts.
    pub fn parse(s: &str) -> Result<Self> {
        match s.split('-').collect::<Vec<_>>().as_slice() {
            [os, arch] if !os.is_empty() && !arch.is_empty() => {
                Ok(Self::new(normalize_os(os), arch::normalize(arch)))
            }
            _ => Err(ParseError::InvalidPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Map a Rust target OS (`std::env::consts::OS`) to a bundle OS tag.
///
/// Unknown values pass through unchanged.
#[must_use]
pub fn normalize_os(os: &str) -> &str {
    match os {
        "linux" => "ubuntu",
        "macos" | "darwin" => "osx",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse() {
        let p = Platform::parse("ubuntu-amd64").unwrap();
        assert_eq!(p.os, "ubuntu");
        assert_eq!(p.arch, "amd64");
    }

    #[test]
    fn test_platform_parse_normalized() {
        let p = Platform::parse("linux-x86_64").unwrap();
        assert_eq!(p, Platform::new("ubuntu", "amd64"));

        let p = Platform::parse("macos-aarch64").unwrap();
        assert_eq!(p, Platform::new("osx", "arm64"));
    }

    #[test]
    fn test_platform_parse_invalid() {
        assert!(Platform::parse("single").is_err());
        assert!(Platform::parse("too-many-parts").is_err());
        assert!(Platform::parse("-amd64").is_err());
    }

    #[test]
    fn test_current_platform() {
        let p = Platform::current();
        assert!(!p.os.is_empty());
        assert!(!p.arch.is_empty());
        assert_ne!(p.os, "linux");
        assert_ne!(p.arch, "x86_64");
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::new("centos", "arm64").to_string(), "centos-arm64");
    }
}
