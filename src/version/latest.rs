//! Latest stable version selection
//!
//! Registries disagree on how "latest" is published: PyPI may carry an
//! explicit stable marker, conda never does. Selection is a small table of
//! rules tried in order; the first rule that yields a version wins.

use crate::version::loose::Version;
use crate::version::types::ReleaseSet;

/// One row of the latest-version decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestRule {
    /// The registry published an explicit stable version
    StableMarker,
    /// Highest version that is not a pre-release
    StableMax,
    /// Highest version of all, pre-releases included
    AnyMax,
}

/// Rules in the order they are consulted
pub const LATEST_RULES: [LatestRule; 3] = [
    LatestRule::StableMarker,
    LatestRule::StableMax,
    LatestRule::AnyMax,
];

impl LatestRule {
    /// Apply this rule alone to a release set
    pub fn apply(self, release_set: &ReleaseSet) -> Option<String> {
        match self {
            LatestRule::StableMarker => release_set.stable_version().map(str::to_string),
            LatestRule::StableMax => find_max(release_set.versions().filter(|v| !v.is_prerelease())),
            LatestRule::AnyMax => find_max(release_set.versions()),
        }
    }
}

/// Determine the latest stable version string of a release set
pub fn select_latest(release_set: &ReleaseSet) -> Option<String> {
    LATEST_RULES
        .iter()
        .find_map(|rule| rule.apply(release_set))
}

fn find_max<'a>(versions: impl Iterator<Item = &'a Version>) -> Option<String> {
    versions.max().map(Version::to_string)
}
