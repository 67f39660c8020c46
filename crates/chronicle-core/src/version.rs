//! Version comparator strategies.
//!
//! The changes store and the generator never compare version strings
//! directly. They go through a [`VersionScheme`], selected at configuration
//! time: collection-style versions follow SemVer, product-core versions use
//! dotted release numbers with regex-classified pre-release tags.

use std::cmp::Ordering;

use regex::Regex;
use semver::Version as SemverVersion;

use crate::error::{Result, VersionError};

/// Strategy for parsing, ordering and classifying version strings.
#[derive(Debug, Clone)]
pub enum VersionScheme {
    /// SemVer ordering; stable iff the pre-release component is empty.
    Semver,
    /// Dotted release versions (`2.10.0b1`, `2.10.0rc2`, `2.10.0`).
    ///
    /// Stability is decided by matching `v<version>` against the configured
    /// tag patterns, mirroring how the product tags its releases.
    Dotted {
        release_tag: Regex,
        pre_release_tag: Regex,
    },
}

impl VersionScheme {
    /// SemVer scheme for collection-style versioning.
    pub fn collection() -> Self {
        Self::Semver
    }

    /// Dotted scheme for product-core versioning.
    pub fn dotted(release_tag_re: &str, pre_release_tag_re: &str) -> Result<Self> {
        let release_tag = Regex::new(release_tag_re)
            .map_err(|e| VersionError::ParseFailed(release_tag_re.to_string(), e.to_string()))?;
        let pre_release_tag = Regex::new(pre_release_tag_re).map_err(|e| {
            VersionError::ParseFailed(pre_release_tag_re.to_string(), e.to_string())
        })?;
        Ok(Self::Dotted {
            release_tag,
            pre_release_tag,
        })
    }

    /// Check that a version string parses under this scheme.
    pub fn validate(&self, version: &str) -> Result<()> {
        self.key(version).map(|_| ())
    }

    /// Compare two version strings.
    pub fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        Ok(self.key(a)?.cmp(&self.key(b)?))
    }

    /// Whether the version denotes a final, non-prerelease release.
    pub fn is_stable(&self, version: &str) -> Result<bool> {
        match self {
            Self::Semver => {
                let parsed = SemverVersion::parse(version)
                    .map_err(|e| VersionError::ParseFailed(version.to_string(), e.to_string()))?;
                Ok(parsed.pre.is_empty())
            }
            Self::Dotted {
                release_tag,
                pre_release_tag,
            } => {
                let tag = format!("v{version}");
                if pre_release_tag.is_match(&tag) {
                    return Ok(false);
                }
                if release_tag.is_match(&tag) {
                    return Ok(true);
                }
                Err(VersionError::InvalidFormat(version.to_string()).into())
            }
        }
    }

    /// Sort version strings in descending order.
    pub fn sort_desc<'a, I>(&self, versions: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keyed = versions
            .into_iter()
            .map(|v| Ok((self.key(v)?, v.to_string())))
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(keyed.into_iter().map(|(_, v)| v).collect())
    }

    /// The greatest version among the given ones, if any.
    pub fn latest<'a, I>(&self, versions: I) -> Result<Option<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Ok(self.sort_desc(versions)?.into_iter().next())
    }

    fn key(&self, version: &str) -> Result<VersionKey> {
        match self {
            Self::Semver => {
                let parsed = SemverVersion::parse(version)
                    .map_err(|e| VersionError::ParseFailed(version.to_string(), e.to_string()))?;
                Ok(VersionKey::Semver(parsed))
            }
            Self::Dotted { .. } => Ok(VersionKey::Dotted(DottedVersion::parse(version)?)),
        }
    }
}

/// Orderable parse result; both variants are never mixed because a scheme
/// produces only its own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionKey {
    Semver(SemverVersion),
    Dotted(DottedVersion),
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Semver(a), Self::Semver(b)) => a.cmp(b),
            (Self::Dotted(a), Self::Dotted(b)) => a.cmp(b),
            (Self::Semver(_), Self::Dotted(_)) => Ordering::Less,
            (Self::Dotted(_), Self::Semver(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pre-release marker inside a dotted version segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreReleaseTag {
    Alpha,
    Beta,
    Rc,
}

/// One dotted segment: a number plus an optional pre-release marker.
///
/// A segment with a marker orders before the same number without one, so
/// `2.10.0b1 < 2.10.0rc1 < 2.10.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DottedSegment {
    number: u64,
    pre: Option<(PreReleaseTag, u64)>,
}

impl Ord for DottedSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number).then_with(|| {
            match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            }
        })
    }
}

impl PartialOrd for DottedSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parsed dotted version, comparable segment by segment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DottedVersion {
    segments: Vec<DottedSegment>,
}

impl DottedVersion {
    fn parse(version: &str) -> Result<Self> {
        if version.is_empty() {
            return Err(
                VersionError::ParseFailed(version.to_string(), "empty version".into()).into(),
            );
        }
        let segments = version
            .split('.')
            .map(|segment| Self::parse_segment(version, segment))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }

    fn parse_segment(version: &str, segment: &str) -> Result<DottedSegment> {
        let fail = |message: &str| {
            VersionError::ParseFailed(version.to_string(), message.to_string()).into()
        };

        let digits: String = segment.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(fail("segment does not start with a number"));
        }
        let number: u64 = digits
            .parse()
            .map_err(|_| -> crate::error::ChronicleError { fail("segment number too large") })?;

        let rest = &segment[digits.len()..];
        if rest.is_empty() {
            return Ok(DottedSegment { number, pre: None });
        }

        let (tag, tail) = if let Some(tail) = rest.strip_prefix("rc") {
            (PreReleaseTag::Rc, tail)
        } else if let Some(tail) = rest.strip_prefix('a') {
            (PreReleaseTag::Alpha, tail)
        } else if let Some(tail) = rest.strip_prefix('b') {
            (PreReleaseTag::Beta, tail)
        } else {
            return Err(fail("unknown pre-release marker"));
        };

        let pre_number = if tail.is_empty() {
            0
        } else {
            tail.parse()
                .map_err(|_| -> crate::error::ChronicleError { fail("invalid pre-release number") })?
        };

        Ok(DottedSegment {
            number,
            pre: Some((tag, pre_number)),
        })
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        let pad = DottedSegment {
            number: 0,
            pre: None,
        };
        for i in 0..len {
            let a = self.segments.get(i).unwrap_or(&pad);
            let b = other.segments.get(i).unwrap_or(&pad);
            match a.cmp(b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChangelogConfig;

    fn dotted() -> VersionScheme {
        let config = ChangelogConfig::default_product();
        VersionScheme::dotted(&config.release_tag_re, &config.pre_release_tag_re).unwrap()
    }

    #[test]
    fn test_semver_ordering() {
        let scheme = VersionScheme::collection();
        let sorted = scheme
            .sort_desc(["1.0.0", "1.2.0-rc1", "1.1.0", "1.10.0"])
            .unwrap();
        assert_eq!(sorted, vec!["1.10.0", "1.2.0-rc1", "1.1.0", "1.0.0"]);
    }

    #[test]
    fn test_semver_stability() {
        let scheme = VersionScheme::collection();
        assert!(scheme.is_stable("1.2.0").unwrap());
        assert!(!scheme.is_stable("1.2.0-rc1").unwrap());
    }

    #[test]
    fn test_semver_parse_failure() {
        let scheme = VersionScheme::collection();
        assert!(scheme.validate("not-a-version").is_err());
    }

    #[test]
    fn test_dotted_ordering() {
        let scheme = dotted();
        let sorted = scheme
            .sort_desc(["2.10.0", "2.10.0b1", "2.10.0rc1", "2.9.1", "2.10.1"])
            .unwrap();
        assert_eq!(
            sorted,
            vec!["2.10.1", "2.10.0", "2.10.0rc1", "2.10.0b1", "2.9.1"]
        );
    }

    #[test]
    fn test_dotted_pre_release_tags_order() {
        let scheme = dotted();
        assert_eq!(
            scheme.compare("2.10.0a1", "2.10.0b1").unwrap(),
            Ordering::Less
        );
        assert_eq!(
            scheme.compare("2.10.0rc2", "2.10.0rc1").unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_dotted_stability() {
        let scheme = dotted();
        assert!(scheme.is_stable("2.10.0").unwrap());
        assert!(!scheme.is_stable("2.10.0b1").unwrap());
        assert!(!scheme.is_stable("2.10.0rc1").unwrap());
    }

    #[test]
    fn test_dotted_short_version_equalish() {
        let scheme = dotted();
        assert_eq!(scheme.compare("2.10", "2.10.0").unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_latest() {
        let scheme = VersionScheme::collection();
        assert_eq!(
            scheme.latest(["1.0.0", "1.1.0"]).unwrap(),
            Some("1.1.0".to_string())
        );
        assert_eq!(scheme.latest([]).unwrap(), None);
    }
}
