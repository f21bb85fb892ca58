//! PEP 440 version identifiers
//!
//! Parsing accepts the alternate spellings pip accepts (`1.0alpha1`,
//! `1.0-1`, `v2.0`, `1.0.rev3`, ...) and normalizes them on display.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::ParseError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?:
            -(?P<post_n1>[0-9]+)
            |
            [-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?
        )?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .unwrap()
});

/// Pre-release phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

impl PreRelease {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::Rc,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            PreRelease::Alpha => "a",
            PreRelease::Beta => "b",
            PreRelease::Rc => "rc",
        }
    }
}

/// One dot-separated segment of a local version label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalSegment {
    Number(u64),
    Text(String),
}

impl Ord for LocalSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (LocalSegment::Number(a), LocalSegment::Number(b)) => a.cmp(b),
            (LocalSegment::Text(a), LocalSegment::Text(b)) => a.cmp(b),
            (LocalSegment::Number(_), LocalSegment::Text(_)) => Ordering::Greater,
            (LocalSegment::Text(_), LocalSegment::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for LocalSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalSegment::Number(n) => write!(f, "{}", n),
            LocalSegment::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A parsed PEP 440 version
///
/// Equality and ordering ignore trailing zero release segments, so
/// `1.0 == 1.0.0`. Display keeps the segments as written.
#[derive(Debug, Clone, Default)]
pub struct Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<(PreRelease, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Vec<LocalSegment>,
}

/// Placement of the pre-release part in the sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    /// `1.0.dev0` sorts before `1.0a0`
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

impl Version {
    /// Build a final release from its segments
    pub fn from_release(release: impl Into<Vec<u64>>) -> Self {
        Self {
            release: release.into(),
            ..Self::default()
        }
    }

    /// True for pre-releases and dev releases
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// The same version without its `+local` label
    pub fn public(&self) -> Version {
        Version {
            local: Vec::new(),
            ..self.clone()
        }
    }

    /// First `n` release segments as a final release, zero padded
    pub fn truncated(&self, n: usize) -> Version {
        let mut release: Vec<u64> = self.release.iter().copied().take(n).collect();
        release.resize(n.max(1), 0);
        Version {
            epoch: self.epoch,
            release,
            ..Self::default()
        }
    }

    /// Release segment `i`, with missing segments read as zero
    pub fn segment(&self, i: usize) -> u64 {
        self.release.get(i).copied().unwrap_or(0)
    }

    /// True when epoch and release segments are equal (padding with zeros)
    pub fn same_release(&self, other: &Version) -> bool {
        self.epoch == other.epoch && cmp_release(&self.release, &other.release).is_eq()
    }

    /// True when `self` starts with every release segment of `prefix`
    pub fn has_prefix(&self, prefix: &Version) -> bool {
        self.epoch == prefix.epoch
            && prefix
                .release
                .iter()
                .enumerate()
                .all(|(i, seg)| self.segment(i) == *seg)
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some((phase, n)), _, _) => PreKey::Pre(phase, n),
            (None, _, _) => PreKey::Final,
        }
    }
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn parse_number(text: Option<regex::Match<'_>>, input: &str) -> Result<u64, ParseError> {
    match text {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| ParseError::invalid_version(input)),
        None => Ok(0),
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VERSION_RE
            .captures(s)
            .ok_or_else(|| ParseError::invalid_version(s))?;

        let epoch = parse_number(caps.name("epoch"), s)?;
        let release = caps["release"]
            .split('.')
            .map(|seg| seg.parse().map_err(|_| ParseError::invalid_version(s)))
            .collect::<Result<Vec<u64>, _>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => Some((
                PreRelease::from_label(label.as_str()),
                parse_number(caps.name("pre_n"), s)?,
            )),
            None => None,
        };

        let post = if caps.name("post_n1").is_some() {
            Some(parse_number(caps.name("post_n1"), s)?)
        } else if caps.name("post_l").is_some() {
            Some(parse_number(caps.name("post_n2"), s)?)
        } else {
            None
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(parse_number(caps.name("dev_n"), s)?),
            None => None,
        };

        let local = caps
            .name("local")
            .map(|m| {
                m.as_str()
                    .split(['-', '_', '.'])
                    .map(|part| match part.parse::<u64>() {
                        Ok(n) => LocalSegment::Number(n),
                        Err(_) => LocalSegment::Text(part.to_ascii_lowercase()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((phase, n)) = self.pre {
            write!(f, "{}{}", phase.as_str(), n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        if !self.local.is_empty() {
            let local: Vec<String> = self.local.iter().map(|s| s.to_string()).collect();
            write!(f, "+{}", local.join("."))?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(&self.release, &other.release))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            // a missing dev part sorts after any dev release
            .then_with(|| (self.dev.is_none(), self.dev).cmp(&(other.dev.is_none(), other.dev)))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Version {}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_simple_release() {
        let version = v("1.2.3");
        assert_eq!(version.release, vec![1, 2, 3]);
        assert_eq!(version.epoch, 0);
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_parse_normalizes_alternate_spellings() {
        assert_eq!(v("1.0alpha1").to_string(), "1.0a1");
        assert_eq!(v("1.0-beta.2").to_string(), "1.0b2");
        assert_eq!(v("1.0c3").to_string(), "1.0rc3");
        assert_eq!(v("1.0-1").to_string(), "1.0.post1");
        assert_eq!(v("1.0.rev4").to_string(), "1.0.post4");
        assert_eq!(v("1.0dev").to_string(), "1.0.dev0");
        assert_eq!(v("v2.0").to_string(), "2.0");
        assert_eq!(v("1!2.0+Ubuntu.1").to_string(), "1!2.0+ubuntu.1");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Version>().is_err());
        assert!("1.0.x".parse::<Version>().is_err());
        assert!("latest".parse::<Version>().is_err());
        assert!("1.0+".parse::<Version>().is_err());
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("2"), v("2.0.0.0"));
        assert_ne!(v("1.0.1"), v("1.0"));
    }

    #[test]
    fn test_ordering_numeric_segments() {
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(v("2.0") > v("1.99.99"));
        assert!(v("1!0.1") > v("2.0"));
    }

    #[test]
    fn test_ordering_pre_post_dev() {
        let mut versions = vec![
            v("1.0.post1"),
            v("1.0"),
            v("1.0rc1"),
            v("1.0b2"),
            v("1.0a1"),
            v("1.0.dev0"),
            v("1.0a1.dev1"),
            v("1.0+local"),
        ];
        versions.sort();
        let rendered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "1.0.dev0",
                "1.0a1.dev1",
                "1.0a1",
                "1.0b2",
                "1.0rc1",
                "1.0",
                "1.0+local",
                "1.0.post1",
            ]
        );
    }

    #[test]
    fn test_local_segment_ordering() {
        assert!(v("1.0+2") > v("1.0+abc"));
        assert!(v("1.0+abc.1") > v("1.0+abc"));
    }

    #[test]
    fn test_prerelease_flags() {
        assert!(v("2.0.0rc1").is_prerelease());
        assert!(v("2.0.0.dev3").is_prerelease());
        assert!(!v("2.0.0.post1").is_prerelease());
        assert!(v("2.0.0.post1").is_postrelease());
    }

    #[test]
    fn test_truncated_and_prefix() {
        assert_eq!(v("6.1.2").truncated(2).to_string(), "6.1");
        assert_eq!(v("7").truncated(2).to_string(), "7.0");
        assert!(v("1.4.5").has_prefix(&v("1.4")));
        assert!(v("1.4").has_prefix(&v("1.4.0")));
        assert!(!v("1.5").has_prefix(&v("1.4")));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("1.0rc1")).unwrap();
        assert_eq!(json, "\"1.0rc1\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("1.0rc1"));
    }
}
