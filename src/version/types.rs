//! Release data shared between registries and the freshness resolver

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::version::loose::{Version, parse_version};

/// Everything a registry reports as ever published for one package
#[derive(Debug, Clone, Default)]
pub struct ReleaseSet {
    /// Releases keyed by their display string, in the order the registry listed them
    releases: IndexMap<String, Version>,
    /// Explicit "latest stable" marker published by the registry
    stable_version: Option<String>,
}

impl ReleaseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stable_version(mut self, stable_version: Option<String>) -> Self {
        self.stable_version = stable_version.filter(|v| !v.trim().is_empty());
        self
    }

    /// Record a release. A later insert of the same version replaces the earlier one.
    pub fn insert(&mut self, version: &str, released_at: Option<DateTime<Utc>>) {
        let parsed = parse_version(version).with_release_date(released_at);
        self.releases.insert(parsed.to_string(), parsed);
    }

    pub fn stable_version(&self) -> Option<&str> {
        self.stable_version.as_deref()
    }

    pub fn get(&self, version: &str) -> Option<&Version> {
        self.releases.get(version.trim())
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.releases.values()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Release date of `version`.
    ///
    /// A version pinned without a build label (conda `numpy=1.21.2`) matches
    /// the earliest dated build of that version.
    pub fn release_date(&self, version: &str) -> Option<DateTime<Utc>> {
        if let Some(release) = self.get(version) {
            return release.release_date();
        }

        let wanted = parse_version(version);
        if !wanted.build_label().is_empty() {
            return None;
        }

        self.releases
            .values()
            .filter(|release| release.version() == wanted.version())
            .filter_map(Version::release_date)
            .min()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Option<DateTime<Utc>>)> for ReleaseSet {
    fn from_iter<I: IntoIterator<Item = (S, Option<DateTime<Utc>>)>>(iter: I) -> Self {
        let mut set = ReleaseSet::new();
        for (version, released_at) in iter {
            set.insert(version.as_ref(), released_at);
        }
        set
    }
}
