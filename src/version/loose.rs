//! Loosely specified version strings
//!
//! Package indexes publish versions that follow no single grammar: semantic
//! versions, calendar versions (`2014.12.24`, `2013-12-31`), legacy tags
//! (`2010l`) and conda builds (`1.0=py37_0`). [`Version`] orders all of them
//! with one rule set instead of an ecosystem-specific grammar:
//!
//! 1. segments are compared pairwise, the shorter list padded with `"0"`;
//!    two purely numeric segments compare as integers, anything else compares
//!    by codepoint
//! 2. the build label breaks ties between equal segment lists
//! 3. a pre-release sorts below an otherwise equal stable release
//!
//! Mixing numeric and lexical comparison means the relation is not transitive
//! for every conceivable input (`"1a" < "2" < "10" < "1a"`). Prefer
//! `Iterator::max` over sorting when the input may mix such segments.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Maximum number of segments kept before the version becomes opaque
const MAX_SEGMENTS: usize = 5;

/// Substrings that mark a version as a pre-release
const PRERELEASE_MARKERS: &[&str] = &[
    "a", "b", "c", "rc", "alpha", "beta", "pre", "preview", "dev", "svn", "git",
];

/// A parsed, comparable version string
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    version: String,
    segments: Vec<String>,
    build_label: String,
    release_date: Option<DateTime<Utc>>,
}

/// Parse a raw version string. Never fails.
///
/// Examples:
/// - "1.2.3" -> ["1", "2", "3"]
/// - "2013-12-31" -> ["2013", "12", "31"]
/// - "1.2.  3" -> ["1", "2", "3"]
/// - "1.0=py37_0" -> ["1", "0"] with build label "py37_0"
/// - "1.2.3.4.5.6" -> ["1.2.3.4.5.6"]
pub fn parse_version(raw: &str) -> Version {
    let raw = raw.trim();
    let (version, build_label) = match raw.split_once('=') {
        Some((version, label)) => (version.trim(), label.trim()),
        None => (raw, ""),
    };

    let normalized = version.replace('-', ".");
    let parts: Vec<String> = normalized
        .split('.')
        .map(|part| part.trim().to_string())
        .collect();

    let segments = if (1..=MAX_SEGMENTS).contains(&parts.len()) {
        parts
    } else {
        vec![version.to_string()]
    };

    Version {
        raw: raw.to_string(),
        version: version.to_string(),
        segments,
        build_label: build_label.to_string(),
        release_date: None,
    }
}

impl Version {
    /// The trimmed input this version was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The version part of the input, without any build label
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Build label following `=`, empty when absent
    pub fn build_label(&self) -> &str {
        &self.build_label
    }

    pub fn release_date(&self) -> Option<DateTime<Utc>> {
        self.release_date
    }

    /// Attach the date this version was published
    pub fn with_release_date(mut self, release_date: Option<DateTime<Utc>>) -> Self {
        self.release_date = release_date;
        self
    }

    /// Coarse pre-release test.
    ///
    /// Any marker appearing anywhere in the version part counts, so `"2010c"`
    /// is a pre-release while a purely numeric or calendar version never is.
    pub fn is_prerelease(&self) -> bool {
        let lowered = self.version.to_lowercase();
        PRERELEASE_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
    }

    fn compare_segments(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| {
                let ours = self.segments.get(i).map(String::as_str).unwrap_or("0");
                let theirs = other.segments.get(i).map(String::as_str).unwrap_or("0");
                compare_segment(ours, theirs)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Three-way comparison of two versions
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.compare_segments(b)
        .then_with(|| a.build_label.cmp(&b.build_label))
        .then_with(|| b.is_prerelease().cmp(&a.is_prerelease()))
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    if is_numeric(a) && is_numeric(b) {
        compare_digits(a, b)
    } else {
        a.cmp(b)
    }
}

/// Integer comparison of digit strings of any length
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other).is_eq()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.build_label.is_empty() {
            write!(f, "{}", self.raw)
        } else {
            write!(f, "{}={}", self.version, self.build_label)
        }
    }
}

impl FromStr for Version {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_version(s))
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        parse_version(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", &["1", "2", "3"])]
    #[case("1.2.  3", &["1", "2", "3"])]
    #[case("1.2.3  ", &["1", "2", "3"])]
    #[case("  3.2", &["3", "2"])]
    #[case("2013-12-31", &["2013", "12", "31"])]
    #[case("1.0.0a1", &["1", "0", "0a1"])]
    #[case("1.2.3.4.5", &["1", "2", "3", "4", "5"])]
    #[case("1.2.3.4.5.6", &["1.2.3.4.5.6"])]
    #[case("1-2-3-4-5-6", &["1-2-3-4-5-6"])]
    #[case("", &[""])]
    #[case("2010l", &["2010l"])]
    fn parse_version_splits_segments(#[case] raw: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_version(raw).segments(), expected);
    }

    #[test]
    fn parse_version_splits_build_label() {
        let version = parse_version(" 1.0=py37_0 ");

        assert_eq!(version.segments(), &["1", "0"]);
        assert_eq!(version.build_label(), "py37_0");
        assert_eq!(version.version(), "1.0");
        assert_eq!(version.raw(), "1.0=py37_0");
    }

    #[rstest]
    #[case("1.0.0a1", true)]
    #[case("1.0.0b2", true)]
    #[case("1.0.0rc1", true)]
    #[case("2.0.0.dev3", true)]
    #[case("1.0-preview", true)]
    #[case("1.0.0-ALPHA", true)]
    #[case("0.1.git20140101", true)]
    #[case("1.0.0", false)]
    #[case("2014.12.24", false)]
    #[case("2013-12-31", false)]
    #[case("1.0=py37h6b1c1e4_0", false)]
    #[case("1.0=py37hbc_0", false)]
    fn is_prerelease_matches_markers(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(parse_version(raw).is_prerelease(), expected);
    }

    #[rstest]
    #[case("3.3.0.2", "3.3.0.20")]
    #[case("3.3.0.20", "3.3.0.22")]
    #[case("3.1.19", "3.2")]
    #[case("3.2", "3.2.1")]
    #[case("2013-12-31", "2014.12.24")]
    #[case("1.0=py37_0", "1.0=py37_1")]
    #[case("1.0", "1.0=py37_0")]
    #[case("2010l", "2015.4")]
    #[case("0.9", "0.10")]
    #[case("1.0.0", "1.0.1a1")]
    fn compare_orders_versions(#[case] lower: &str, #[case] higher: &str) {
        let lower = parse_version(lower);
        let higher = parse_version(higher);

        assert_eq!(compare(&lower, &higher), Ordering::Less);
        assert_eq!(compare(&higher, &lower), Ordering::Greater);
        assert!(lower < higher);
    }

    #[rstest]
    #[case("1.0", "1.0.0")]
    #[case("1.2.3", "1.2.3  ")]
    #[case("1.02", "1.2")]
    #[case("2013-12-31", "2013.12.31")]
    fn compare_treats_padded_and_normalized_versions_as_equal(
        #[case] a: &str,
        #[case] b: &str,
    ) {
        assert_eq!(parse_version(a), parse_version(b));
    }

    #[rstest]
    #[case("1.0", "1.1a1")]
    #[case("1.0.0", "1.0.0rc1")]
    fn prerelease_is_not_consulted_when_segments_differ(
        #[case] stable: &str,
        #[case] prerelease: &str,
    ) {
        let stable = parse_version(stable);
        let prerelease = parse_version(prerelease);

        assert!(prerelease.is_prerelease());
        assert!(stable < prerelease);
    }

    #[test]
    fn prerelease_breaks_ties_after_segments_and_label() {
        // Parsed versions with equal segments share their markers, so build
        // the value directly.
        let stable = parse_version("1");
        let prerelease = Version {
            raw: "1".to_string(),
            version: "1-dev".to_string(),
            segments: vec!["1".to_string()],
            build_label: String::new(),
            release_date: None,
        };

        assert_eq!(compare(&prerelease, &stable), Ordering::Less);
        assert_eq!(compare(&stable, &prerelease), Ordering::Greater);
    }

    #[test]
    fn numeric_comparison_handles_long_digit_runs() {
        let a = parse_version("1.99999999999999999999999999999");
        let b = parse_version("1.100000000000000000000000000000");

        assert!(a < b);
    }

    #[test]
    fn release_date_does_not_affect_ordering() {
        let dated = parse_version("1.0").with_release_date(Some(Utc::now()));
        let undated = parse_version("1.0");

        assert_eq!(dated, undated);
    }

    #[rstest]
    #[case("1.2.3", "1.2.3")]
    #[case(" 1.2.3 ", "1.2.3")]
    #[case("1.0=py37_0", "1.0=py37_0")]
    #[case("1.0 = py37_0", "1.0=py37_0")]
    fn display_renders_version_and_label(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse_version(raw).to_string(), expected);
    }
}
