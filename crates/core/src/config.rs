//! Configuration for tooldist.
//!
//! Read from `config.toml`:
//!
//! ```toml
//! stream = "devel"
//! platform = "ubuntu-arm64"
//! version = "2.1.0"
//!
//! [storage]
//! private = "/var/lib/tooldist"
//! public = "/srv/tools"
//! ```
//!
//! Every key is optional.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tooldist_version::{Binary, Number, Platform};
use tracing::debug;

/// Stream used when none is configured.
pub const DEFAULT_STREAM: &str = "released";

/// Configuration as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Release stream to upload to and list from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    /// Target platform as `os-arch`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Version stamped on uploaded bundles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Store locations.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Store locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root of the writable store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<PathBuf>,

    /// Root of the shared read-only store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<PathBuf>,
}

/// Resolved configuration with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Release stream.
    pub stream: String,
    /// Platform bundles are built for and resolved against.
    pub platform: Platform,
    /// Version of the running toolchain.
    pub version: Number,
    /// Store locations.
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the user config file is
    /// read if present, and defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a file cannot be read or parsed, or holds
    /// an invalid platform or version.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };
        let Some(path) = path else {
            debug!("No config file, using defaults");
            return Self::from_file(ConfigFile::default());
        };

        debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::config(
                format!("cannot read {}: {e}", path.display()),
                "Check the --config path",
            )
        })?;
        Self::from_toml(&content)
    }

    /// Location of the user config file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tooldist").join("config.toml"))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on syntax errors, unknown keys, or invalid
    /// values.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| {
            Error::config(
                format!("invalid config: {}", e.message()),
                "Known keys are stream, platform, version and [storage] private/public",
            )
        })?;
        Self::from_file(file)
    }

    /// Apply defaults to a parsed file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the platform or version is malformed.
    pub fn from_file(file: ConfigFile) -> Result<Self> {
        let platform = match file.platform {
            Some(p) => Platform::parse(&p)
                .map_err(|e| Error::config(e.to_string(), "Write the platform as os-arch, e.g. ubuntu-amd64"))?,
            None => Platform::current(),
        };
        let version = Number::parse(file.version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION")))
            .map_err(|e| Error::config(e.to_string(), "Write the version as major.minor.patch"))?;
        Ok(Self {
            stream: file.stream.unwrap_or_else(|| DEFAULT_STREAM.to_string()),
            platform,
            version,
            storage: file.storage,
        })
    }

    /// The binary the uploader stamps on bundles built from this toolchain.
    #[must_use]
    pub fn current_binary(&self) -> Binary {
        Binary::for_platform(self.version, &self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.stream, "released");
        assert_eq!(config.platform, Platform::current());
        assert_eq!(config.version, Number::parse(env!("CARGO_PKG_VERSION")).unwrap());
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(
            r#"
stream = "devel"
platform = "ubuntu-arm64"
version = "2.1.0"

[storage]
private = "/var/lib/tooldist"
public = "/srv/tools"
"#,
        )
        .unwrap();
        assert_eq!(config.stream, "devel");
        assert_eq!(config.platform, Platform::new("ubuntu", "arm64"));
        assert_eq!(config.current_binary().to_string(), "2.1.0-ubuntu-arm64");
        assert_eq!(config.storage.private, Some(PathBuf::from("/var/lib/tooldist")));
        assert_eq!(config.storage.public, Some(PathBuf::from("/srv/tools")));
    }

    #[test]
    fn test_unknown_key() {
        let err = Config::from_toml("streem = \"devel\"").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_bad_version() {
        let err = Config::from_toml("version = \"2.1\"").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_bad_platform() {
        let err = Config::from_toml("platform = \"ubuntu\"").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "stream = \"proposed\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.stream, "proposed");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(Some(&temp.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
