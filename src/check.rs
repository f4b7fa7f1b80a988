//! Concurrent freshness checking of parsed requirements

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::{FETCH_TIMEOUT_MS, MAX_CONCURRENT_FETCHES};
use crate::parser::types::{Requirement, RequirementEntry, Source};
use crate::version::error::RegistryError;
use crate::version::freshness::{Freshness, resolve};
use crate::version::registry::Registry;

/// Registries available to the checker, one per source
pub type Registries = HashMap<Source, Arc<dyn Registry>>;

/// Limits applied while fetching release sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Maximum number of fetches in flight
    pub max_concurrent: usize,
    /// Timeout for a single fetch
    pub timeout: Duration,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            max_concurrent: MAX_CONCURRENT_FETCHES,
            timeout: Duration::from_millis(FETCH_TIMEOUT_MS),
        }
    }
}

/// Result of checking one requirement entry
#[derive(Debug)]
pub enum CheckOutcome {
    /// Line passed through for verbatim output
    Verbatim(String),
    /// Requirement marked `# norot`; not fetched
    Ignored(Requirement),
    /// Release data was fetched and resolved; either side may still be missing
    Resolved {
        requirement: Requirement,
        freshness: Freshness,
    },
    /// Release data could not be fetched
    Failed {
        requirement: Requirement,
        error: RegistryError,
    },
}

impl CheckOutcome {
    pub fn requirement(&self) -> Option<&Requirement> {
        match self {
            CheckOutcome::Verbatim(_) => None,
            CheckOutcome::Ignored(requirement)
            | CheckOutcome::Resolved { requirement, .. }
            | CheckOutcome::Failed { requirement, .. } => Some(requirement),
        }
    }
}

/// Fetch and resolve a single requirement
async fn check_requirement(
    registries: &Registries,
    requirement: Requirement,
    timeout: Duration,
) -> CheckOutcome {
    let Some(registry) = registries.get(&requirement.source) else {
        warn!(
            "No registry configured for {}/{}",
            requirement.source, requirement.name
        );
        return CheckOutcome::Failed {
            error: RegistryError::NotFound(requirement.name.clone()),
            requirement,
        };
    };

    debug!(
        "Fetching releases for {}/{}",
        requirement.source, requirement.name
    );

    let fetched = tokio::time::timeout(timeout, registry.fetch_release_set(&requirement.name))
        .await
        .unwrap_or_else(|_| {
            Err(RegistryError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ))
        });

    match fetched {
        Ok(release_set) => {
            info!(
                "Fetched {} releases for {}/{}",
                release_set.len(),
                requirement.source,
                requirement.name
            );
            let freshness = resolve(&requirement.name, &requirement.version, &release_set);
            CheckOutcome::Resolved {
                requirement,
                freshness,
            }
        }
        Err(error) => {
            warn!(
                "Failed to fetch releases for {}/{}: {}",
                requirement.source, requirement.name, error
            );
            CheckOutcome::Failed { requirement, error }
        }
    }
}

/// Check every entry against its registry
///
/// Fetches run concurrently, at most `options.max_concurrent` at a time.
/// Outcomes are returned in entry order. A failed fetch only affects its own
/// requirement.
pub async fn check_requirements(
    registries: &Registries,
    entries: Vec<RequirementEntry>,
    options: CheckOptions,
) -> Vec<CheckOutcome> {
    stream::iter(entries)
        .map(|entry| async move {
            match entry {
                RequirementEntry::Verbatim { line } => CheckOutcome::Verbatim(line),
                RequirementEntry::Package(requirement) if requirement.ignore => {
                    CheckOutcome::Ignored(requirement)
                }
                RequirementEntry::Package(requirement) => {
                    check_requirement(registries, requirement, options.timeout).await
                }
            }
        })
        .buffered(options.max_concurrent.max(1))
        .collect()
        .await
}
