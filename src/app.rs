//! Wiring of parsers, registries, checker and report for one run

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

use crate::check::{CheckOptions, Registries, check_requirements};
use crate::config::{Config, USER_AGENT};
use crate::parser::{self, RequirementEntry, Source};
use crate::remote::RemoteClient;
use crate::report::{ReportOptions, Reporter, Summary};
use crate::version::registries::conda::CondaCli;
use crate::version::registries::{CondaRegistry, PypiRegistry};

/// Where requirements are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementsInput {
    /// A local file; includes resolve relative to it
    File(PathBuf),
    /// Standard input
    Stdin,
    /// A file inside a GitHub repository
    GitHub {
        repo: String,
        branch: Option<String>,
        path: Option<String>,
        token: Option<String>,
    },
    /// Any URL serving a requirements file
    Url(String),
}

/// Everything a run needs besides configuration
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub inputs: Vec<RequirementsInput>,
    /// Source override; detected from file names when unset
    pub source: Option<Source>,
    pub report: ReportOptions,
}

/// Create the HTTP client shared by every registry
pub fn build_http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_millis(config.fetch.timeout))
        .build()
        .context("Failed to create HTTP client")
}

/// Create the default registry for every supported source
pub fn create_default_registries(config: &Config, client: &Client) -> Registries {
    let mut registries: Registries = HashMap::new();

    registries.insert(
        Source::PyPI,
        Arc::new(PypiRegistry::with_client(
            &config.registries.pypi.base_url,
            client.clone(),
        )),
    );

    registries.insert(
        Source::Conda,
        Arc::new(CondaRegistry::new(CondaCli::new(
            &config.registries.conda.executable,
            config.registries.conda.basepath.as_deref(),
        ))),
    );

    registries
}

/// Collect requirement entries from every input
pub async fn load_entries(
    inputs: &[RequirementsInput],
    source: Option<Source>,
    verbatim: bool,
    remote: &RemoteClient,
) -> anyhow::Result<Vec<RequirementEntry>> {
    let mut entries = Vec::new();

    for input in inputs {
        match input {
            RequirementsInput::File(path) => {
                let source = source.unwrap_or_else(|| parser::detect_source(path));
                debug!("Parsing {} as {}", path.display(), source);
                entries.extend(parser::parser_for(source, verbatim).parse_file(path)?);
            }
            RequirementsInput::Stdin => {
                entries.extend(load_reader(tokio::io::stdin(), source, verbatim).await?);
            }
            RequirementsInput::GitHub {
                repo,
                branch,
                path,
                token,
            } => {
                let url = remote
                    .build_github_url(
                        repo,
                        branch.as_deref(),
                        path.as_deref(),
                        token.as_deref(),
                    )
                    .await;
                entries.extend(load_remote(remote, &url, source).await?);
            }
            RequirementsInput::Url(url) => {
                entries.extend(load_remote(remote, url, source).await?);
            }
        }
    }

    Ok(entries)
}

/// Parse requirements streamed from `reader`; includes resolve against the working directory
async fn load_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    source: Option<Source>,
    verbatim: bool,
) -> anyhow::Result<Vec<RequirementEntry>> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .await
        .context("Failed to read requirements from stdin")?;
    let parser = parser::parser_for(source.unwrap_or(Source::PyPI), verbatim);
    let cwd = std::env::current_dir().ok();
    Ok(parser.parse(&content, cwd.as_deref()))
}

/// Remote files are never reproduced verbatim and cannot include other files
async fn load_remote(
    remote: &RemoteClient,
    url: &str,
    source: Option<Source>,
) -> anyhow::Result<Vec<RequirementEntry>> {
    info!("Fetching requirements from {}", url);
    let content = remote
        .fetch_requirements(url)
        .await
        .with_context(|| format!("Failed to fetch requirements from {url}"))?;
    let parser = parser::parser_for(source.unwrap_or(Source::PyPI), false);
    Ok(parser.parse(&content, None))
}

/// Check the requirements and write the report
pub async fn run<W: Write>(
    config: &Config,
    registries: &Registries,
    remote: &RemoteClient,
    options: &RunOptions,
    out: &mut W,
) -> anyhow::Result<Summary> {
    let entries = load_entries(
        &options.inputs,
        options.source,
        options.report.verbatim,
        remote,
    )
    .await?;
    info!("Checking {} requirement entries", entries.len());

    let check_options = CheckOptions {
        max_concurrent: config.fetch.max_concurrent,
        timeout: Duration::from_millis(config.fetch.timeout),
    };
    let outcomes = check_requirements(registries, entries, check_options).await;

    Reporter::new(options.report)
        .write(out, &outcomes)
        .context("Failed to write report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Requirement;

    #[tokio::test]
    async fn load_reader_parses_streamed_requirements() {
        let input: &[u8] = b"# pinned\nrequests==1.1.0\n";

        let entries = load_reader(input, None, true).await.unwrap();

        assert_eq!(
            entries,
            vec![
                RequirementEntry::Verbatim {
                    line: "# pinned".to_string()
                },
                RequirementEntry::Package(Requirement {
                    source: Source::PyPI,
                    name: "requests".to_string(),
                    version: "1.1.0".to_string(),
                    ignore: false,
                }),
            ]
        );
    }

    #[tokio::test]
    async fn load_reader_uses_requested_source() {
        let input: &[u8] = b"numpy=1.21.2=py39h20f2e39_0\n";

        let entries = load_reader(input, Some(Source::Conda), false).await.unwrap();

        assert_eq!(
            entries[0].as_requirement().map(|r| (r.source, r.version.as_str())),
            Some((Source::Conda, "1.21.2=py39h20f2e39_0"))
        );
    }
}
