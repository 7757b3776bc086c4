//! Binary versions: a release number qualified by OS and architecture.

use crate::error::{ParseError, Result};
use crate::number::Number;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The version of a tool bundle built for one OS and architecture.
///
/// Serialized as `major.minor.patch-os-arch`. Ordered by number first, with
/// OS and architecture as tie-breaking qualifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Binary {
    /// Release number.
    pub number: Number,
    /// Operating system (or, for legacy bundles, the OS series).
    pub os: String,
    /// CPU architecture tag.
    pub arch: String,
}

impl Binary {
    /// Create a binary version.
    #[must_use]
    pub fn new(number: Number, os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            number,
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Create a binary version whose OS and architecture survive the
    /// `number-os-arch` form.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidTag`] as [`Binary::validate`] does.
    pub fn try_new(number: Number, os: impl Into<String>, arch: impl Into<String>) -> Result<Self> {
        let binary = Self::new(number, os, arch);
        binary.validate()?;
        Ok(binary)
    }

    /// Check that the OS and architecture tags are non-empty and free of
    /// `-`, path separators and whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidTag`] naming the first bad component.
    pub fn validate(&self) -> Result<()> {
        check_tag("os", &self.os)?;
        check_tag("arch", &self.arch)
    }

    /// Create a binary version for the given platform.
    #[must_use]
    pub fn for_platform(number: Number, platform: &Platform) -> Self {
        Self::new(number, platform.os.clone(), platform.arch.clone())
    }

    /// Parse a `major.minor.patch-os-arch` string.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidBinary`] if the string does not have
    /// exactly three `-`-separated parts with non-empty OS and architecture,
    /// or if the number part is malformed.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || ParseError::InvalidBinary(s.to_string());
        let mut parts = s.split('-');
        let (Some(number), Some(os), Some(arch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let number = Number::parse(number).map_err(|_| invalid())?;
        Self::try_new(number, os, arch).map_err(|_| invalid())
    }

    /// Major version shorthand.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.number.major
    }

    /// Minor version shorthand.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.number.minor
    }

    /// The platform this binary targets.
    #[must_use]
    pub fn platform(&self) -> Platform {
        Platform::new(self.os.clone(), self.arch.clone())
    }
}

fn check_tag(kind: &'static str, value: &str) -> Result<()> {
    if value.is_empty()
        || value.contains(['-', '/', '\\'])
        || value.chars().any(char::is_whitespace)
    {
        return Err(ParseError::InvalidTag {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.number, self.os, self.arch)
    }
}

impl FromStr for Binary {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Binary {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Binary> for String {
    fn from(b: Binary) -> Self {
        b.to_string()
    }
}
