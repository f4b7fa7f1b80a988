//! Registry trait for fetching release sets from package sources

#[cfg(test)]
use mockall::automock;

use crate::parser::types::Source;
use crate::version::error::RegistryError;
use crate::version::types::ReleaseSet;

/// Trait for fetching everything a source has published for a package
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Returns the source this implementation handles
    fn source(&self) -> Source;

    /// Fetches all releases of a package together with their release dates
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "requests")
    ///
    /// # Returns
    /// * `Ok(ReleaseSet)` - Every known release, plus the stable marker when the source publishes one
    /// * `Err(RegistryError)` - If the fetch fails or the package is unknown
    async fn fetch_release_set(&self, package_name: &str) -> Result<ReleaseSet, RegistryError>;
}
