//! Minimal semantic version model.
//!
//! Versions are parsed permissively: an optional leading `v` is stripped and
//! anything after `major.minor.patch[-prerelease]` is ignored, so
//! `"2.0.0+build.1"` and `"2.0.0"` compare equal.
//!
//! Ordering follows the numeric triple first. On a tie, a stable release sorts
//! after any prerelease, and two prerelease tags are compared as plain strings.
//! That last rule is simpler than full semver identifier ordering
//! (`alpha.10 < alpha.9` here) and is kept so that results stay stable against
//! existing IoC fixtures.
//!
//! # Example
//!
//! ```
//! use iocscan::version::{equal, Version};
//!
//! let v = Version::parse("v1.2.3-beta").unwrap();
//! assert_eq!(v.major, 1);
//! assert_eq!(v.prerelease.as_deref(), Some("beta"));
//! assert!(equal("1.2.3", "v1.2.3"));
//! ```

pub mod range;

pub use range::{is_exact, satisfies, Comparator, RangeSpecifier};

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:-([A-Za-z0-9.-]+))?").expect("valid version pattern")
});

/// A parsed `major.minor.patch[-prerelease]` version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    pub fn with_prerelease(mut self, tag: impl Into<String>) -> Self {
        self.prerelease = Some(tag.into());
        self
    }

    /// Parses a version string.
    ///
    /// Returns `None` for empty input, a missing numeric triple, or a
    /// component that does not fit in a `u64`. Surrounding whitespace and a
    /// single leading `v` are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('v').unwrap_or(text);
        if text.is_empty() {
            return None;
        }

        let caps = VERSION_RE.captures(text)?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
            prerelease: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }

    fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple()
            .cmp(&other.triple())
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

/// Total ordering of two parsed versions.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}

/// Returns true when both strings parse and denote the same version.
///
/// An unparseable side is never equal to anything, including itself.
pub fn equal(a: &str, b: &str) -> bool {
    match (Version::parse(a), Version::parse(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
