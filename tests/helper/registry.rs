//! Registry test utilities

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use reqrot::check::Registries;
use reqrot::parser::Source;
use reqrot::version::ReleaseSet;
use reqrot::version::error::RegistryError;
use reqrot::version::registry::Registry;

/// Mock registry serving canned release sets
pub struct MockRegistry {
    source: Source,
    releases: HashMap<String, ReleaseSet>,
}

impl MockRegistry {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            releases: HashMap::new(),
        }
    }

    /// Releases as (version, "YYYY-MM-DD") pairs; an empty date means undated
    pub fn with_releases(mut self, package: &str, releases: &[(&str, &str)]) -> Self {
        let release_set = releases
            .iter()
            .map(|(version, date)| (*version, parse_date(date)))
            .collect();
        self.releases.insert(package.to_string(), release_set);
        self
    }

    pub fn with_release_set(mut self, package: &str, release_set: ReleaseSet) -> Self {
        self.releases.insert(package.to_string(), release_set);
        self
    }

    pub fn into_registries(self) -> Registries {
        HashMap::from([(self.source, Arc::new(self) as Arc<dyn Registry>)])
    }
}

#[async_trait]
impl Registry for MockRegistry {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch_release_set(&self, package_name: &str) -> Result<ReleaseSet, RegistryError> {
        self.releases
            .get(package_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }
}

/// Midnight UTC of a `YYYY-MM-DD` date
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
