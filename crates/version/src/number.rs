//! Release version numbers.

use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` release number.
///
/// Ordering is lexicographic over the three components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Number {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch level.
    pub patch: u32,
}

impl Number {
    /// Create a version number.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a `major.minor.patch` string.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidNumber`] unless the input is exactly three
    /// dot-separated runs of ASCII digits.
    ///
    /// Leading zeros are accepted, so `1.01.0` and `1.1.0` parse to the same
    /// number. Callers that need the exact text keep it alongside.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || ParseError::InvalidNumber(s.to_string());
        let mut parts = s.split('.');
        let mut component = || -> Result<u32> {
            let part = parts.next().ok_or_else(invalid)?;
            // u32::from_str accepts a leading '+', so check digits first
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let number = Self::new(component()?, component()?, component()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(number)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Number {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Number {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Number> for String {
    fn from(n: Number) -> Self {
        n.to_string()
    }
}
