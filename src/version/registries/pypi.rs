//! PyPI registry client for fetching Python package releases

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::DEFAULT_PYPI_BASE_URL;
use crate::parser::types::Source;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::ReleaseSet;

/// Format of `upload_time` in the PyPI JSON API
const UPLOAD_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// PyPI registry client
pub struct PypiRegistry {
    client: Client,
    base_url: String,
}

impl Default for PypiRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PYPI_BASE_URL)
    }
}

impl PypiRegistry {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a registry sharing an already configured HTTP client
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// PyPI JSON API response structure
#[derive(Debug, Deserialize)]
struct PypiResponse {
    #[serde(default)]
    info: PypiInfo,
    #[serde(default)]
    releases: HashMap<String, Vec<PypiFile>>,
}

/// Package information from PyPI
#[derive(Debug, Default, Deserialize)]
struct PypiInfo {
    /// Explicit stable release, absent for most packages
    #[serde(default)]
    stable_version: Option<String>,
}

/// A distribution file uploaded for a release
#[derive(Debug, Deserialize)]
struct PypiFile {
    upload_time: Option<String>,
}

fn parse_upload_time(upload_time: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(upload_time, UPLOAD_TIME_FORMAT)
        .inspect_err(|e| debug!("Unparseable upload_time '{}': {}", upload_time, e))
        .ok()
        .map(|naive| naive.and_utc())
}

/// A release is dated by its earliest uploaded file; releases without files have no date
fn release_date(files: &[PypiFile]) -> Option<DateTime<Utc>> {
    files
        .iter()
        .filter_map(|file| file.upload_time.as_deref())
        .filter_map(parse_upload_time)
        .min()
}

#[async_trait]
impl Registry for PypiRegistry {
    fn source(&self) -> Source {
        Source::PyPI
    }

    async fn fetch_release_set(&self, package_name: &str) -> Result<ReleaseSet, RegistryError> {
        let url = format!("{}/pypi/{}/json", self.base_url, package_name);
        debug!("Fetching PyPI package: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            return Err(RegistryError::InvalidResponse(format!(
                "PyPI API returned status {}",
                response.status()
            )));
        }

        let pypi_response: PypiResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        let release_set = pypi_response
            .releases
            .iter()
            .map(|(version, files)| (version, release_date(files)))
            .collect::<ReleaseSet>()
            .with_stable_version(pypi_response.info.stable_version);

        debug!(
            "Found {} releases for package {}",
            release_set.len(),
            package_name
        );

        Ok(release_set)
    }
}
