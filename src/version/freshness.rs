//! Freshness of a pinned version relative to the latest stable release

use chrono::{DateTime, Utc};

use crate::version::latest::select_latest;
use crate::version::loose::parse_version;
use crate::version::types::ReleaseSet;

/// A version together with the date it was published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub version: String,
    pub released_at: DateTime<Utc>,
}

/// Result of resolving one requirement against its release set
///
/// Either side is `None` when the registry has no dated release for it:
/// a pin to a version that was removed, or a package unknown to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Freshness {
    pub name: String,
    pub pinned: Option<ResolvedRelease>,
    pub latest: Option<ResolvedRelease>,
}

/// Status of a pinned version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessStatus {
    /// Pinned version is the latest stable version
    UpToDate,
    /// A different version is the latest; `days` may be zero
    OutOfDate { days: i64 },
    /// One side could not be dated
    NotFound,
}

impl Freshness {
    /// Days between the pinned release and the latest release
    pub fn staleness_days(&self) -> Option<i64> {
        let pinned = self.pinned.as_ref()?;
        let latest = self.latest.as_ref()?;
        Some((latest.released_at - pinned.released_at).num_days())
    }

    pub fn is_found(&self) -> bool {
        self.pinned.is_some() && self.latest.is_some()
    }

    pub fn is_up_to_date(&self) -> bool {
        match (&self.pinned, &self.latest) {
            (Some(pinned), Some(latest)) => covers(&pinned.version, &latest.version),
            _ => false,
        }
    }

    pub fn is_out_of_date(&self) -> bool {
        match (&self.pinned, &self.latest) {
            (Some(pinned), Some(latest)) => {
                pinned.released_at != latest.released_at
                    || self.staleness_days().is_some_and(|days| days > 0)
            }
            _ => false,
        }
    }

    pub fn status(&self) -> FreshnessStatus {
        match self.staleness_days() {
            None => FreshnessStatus::NotFound,
            Some(_) if self.is_up_to_date() => FreshnessStatus::UpToDate,
            Some(days) => FreshnessStatus::OutOfDate { days },
        }
    }
}

/// Resolve the pinned and latest stable releases of a requirement
pub fn resolve(name: &str, pinned_version: &str, release_set: &ReleaseSet) -> Freshness {
    let pinned_version = pinned_version.trim();
    let latest = select_latest(release_set).and_then(|latest| dated(&latest, release_set));
    let pinned = match &latest {
        Some(latest) if covers(pinned_version, &latest.version) => Some(ResolvedRelease {
            version: pinned_version.to_string(),
            released_at: latest.released_at,
        }),
        _ => dated(pinned_version, release_set),
    };

    Freshness {
        name: name.to_string(),
        pinned,
        latest,
    }
}

/// A pin without a build label covers every build of its version
fn covers(pinned: &str, latest: &str) -> bool {
    if pinned == latest {
        return true;
    }
    let pinned = parse_version(pinned);
    pinned.build_label().is_empty() && pinned.version() == parse_version(latest).version()
}

fn dated(version: &str, release_set: &ReleaseSet) -> Option<ResolvedRelease> {
    release_set
        .release_date(version)
        .map(|released_at| ResolvedRelease {
            version: version.to_string(),
            released_at,
        })
}
