//! conda channel registry backed by the `conda` executable
//!
//! conda has no public JSON API comparable to PyPI's, so release data comes
//! from `conda info <package> --json`. Every build of a version is a separate
//! release keyed `version=build`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::config::DEFAULT_CONDA_EXECUTABLE;
use crate::parser::types::Source;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::ReleaseSet;

/// Timestamps above this are milliseconds (last second of year 9999)
const MAX_SECONDS_TIMESTAMP: i64 = 253_402_300_799;

/// Captured output of a finished process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs the conda command line with extra arguments
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[&str]) -> Result<CommandOutput, RegistryError>;
}

/// Invokes a real conda installation
#[derive(Debug, Clone)]
pub struct CondaCli {
    command: Vec<PathBuf>,
}

impl Default for CondaCli {
    fn default() -> Self {
        Self::new(DEFAULT_CONDA_EXECUTABLE, None)
    }
}

impl CondaCli {
    /// Uses `executable` from `PATH`, or the interpreter and script inside
    /// `basepath` when a specific installation is given.
    pub fn new(executable: &str, basepath: Option<&Path>) -> Self {
        let command = match basepath {
            Some(base) if cfg!(windows) => vec![
                base.join("python.exe"),
                base.join("Scripts").join("conda-script.py"),
            ],
            Some(base) => vec![base.join("bin/python"), base.join("bin/conda")],
            None => vec![PathBuf::from(executable)],
        };
        Self { command }
    }

    pub fn command(&self) -> &[PathBuf] {
        &self.command
    }
}

#[async_trait]
impl CommandRunner for CondaCli {
    async fn run(&self, args: &[&str]) -> Result<CommandOutput, RegistryError> {
        let Some((program, prefix)) = self.command.split_first() else {
            return Err(RegistryError::Command("empty conda command".to_string()));
        };

        debug!("Running {:?} {:?}", self.command, args);
        let output = tokio::process::Command::new(program)
            .args(prefix)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                RegistryError::Command(format!("could not invoke {:?}: {}", self.command, e))
            })?;

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// One package record from `conda info --json`
#[derive(Debug, Deserialize)]
struct CondaRecord {
    version: String,
    #[serde(default)]
    build: String,
    /// Upload time, seconds or milliseconds since the epoch depending on channel age
    timestamp: Option<i64>,
    /// Older channels carry only a `YYYY-MM-DD` date
    date: Option<String>,
}

impl CondaRecord {
    fn key(&self) -> String {
        if self.build.is_empty() {
            self.version.clone()
        } else {
            format!("{}={}", self.version, self.build)
        }
    }

    fn release_date(&self) -> Option<DateTime<Utc>> {
        match self.timestamp {
            Some(ts) if ts > MAX_SECONDS_TIMESTAMP => DateTime::from_timestamp_millis(ts),
            Some(ts) if ts > 0 => DateTime::from_timestamp(ts, 0),
            _ => self
                .date
                .as_deref()
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc()),
        }
    }
}

/// Registry reading releases from a conda channel
pub struct CondaRegistry<R: CommandRunner = CondaCli> {
    runner: R,
}

impl Default for CondaRegistry {
    fn default() -> Self {
        Self::new(CondaCli::default())
    }
}

impl<R: CommandRunner> CondaRegistry<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl<R: CommandRunner> Registry for CondaRegistry<R> {
    fn source(&self) -> Source {
        Source::Conda
    }

    async fn fetch_release_set(&self, package_name: &str) -> Result<ReleaseSet, RegistryError> {
        let args = ["info", package_name, "--json"];
        let output = self.runner.run(&args).await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(RegistryError::Command(format!(
                "conda {}: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        let mut packages: HashMap<String, serde_json::Value> =
            serde_json::from_slice(&output.stdout)
                .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        let Some(records) = packages.remove(package_name) else {
            return Err(RegistryError::NotFound(package_name.to_string()));
        };

        let records: Vec<CondaRecord> = serde_json::from_value(records)
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        if records.is_empty() {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        debug!(
            "Found {} conda builds for package {}",
            records.len(),
            package_name
        );

        Ok(records
            .iter()
            .map(|record| (record.key(), record.release_date()))
            .collect())
    }
}
