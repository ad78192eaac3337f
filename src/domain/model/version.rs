//! Dotted major.minor.patch versions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModError;

/// A normalized three-component version.
///
/// Inputs with fewer than three components are right-padded with zeros, so
/// `"0.14"` and `"0.14.0"` compare equal. Ordering is lexicographic over
/// (major, minor, patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// `0.0.0`, used as the "any game version" wildcard.
    pub const ZERO: Version = Version::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::ZERO
    }
}

impl FromStr for Version {
    type Err = ModError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModError::InvalidVersion {
            input: s.to_string(),
        };

        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }

        let mut components = [0u64; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Version::new(components[0], components[1], components[2]))
    }
}

impl TryFrom<String> for Version {
    type Error = ModError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
