use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::bail;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use reqrot::app::{self, RequirementsInput, RunOptions};
use reqrot::config::{Config, DEFAULT_REQUIREMENTS_FILE};
use reqrot::parser::Source;
use reqrot::remote::RemoteClient;
use reqrot::report::ReportOptions;

#[derive(Parser)]
#[command(name = "reqrot")]
#[command(version, about = "How rotten are your requirements?")]
#[command(after_help = "Here's hoping your requirements are nice and fresh!")]
struct Cli {
    /// Requirements file(s), use `-` for stdin [default: requirements.txt]
    files: Vec<PathBuf>,

    /// Print a status line for every requirement (default unless --quiet or --verbatim)
    #[arg(short, long)]
    verbose: bool,

    /// Only print the summary line
    #[arg(short, long)]
    quiet: bool,

    /// Print the latest available version for out of date requirements
    #[arg(short, long)]
    latest: bool,

    /// Output the full requirements file, with comments showing potential updates
    #[arg(short = 'x', long)]
    verbatim: bool,

    /// Only list outdated requirements
    #[arg(short, long)]
    outdated: bool,

    /// Check the requirements file of a GitHub repository (owner/name or URL)
    #[arg(short, long, value_name = "REPO")]
    github: Option<String>,

    /// Branch to read the requirements file from, with --github
    #[arg(short, long, requires = "github")]
    branch: Option<String>,

    /// GitHub personal access token, with --github
    #[arg(short, long, requires = "github")]
    token: Option<String>,

    /// Path of the requirements file inside the repository, with --github
    #[arg(short, long, requires = "github")]
    path: Option<String>,

    /// Days an outdated requirement is tolerated before the check fails
    #[arg(short, long, value_name = "DAYS")]
    delay: Option<u32>,

    /// URL of a requirements file
    #[arg(short, long, conflicts_with = "github")]
    url: Option<String>,

    /// Package source of the requirements (pypi or conda); detected from file names by default
    #[arg(short, long)]
    source: Option<Source>,

    /// Configuration file [default: $XDG_CONFIG_HOME/reqrot/config.json]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn inputs(&self) -> anyhow::Result<Vec<RequirementsInput>> {
        let mut inputs: Vec<_> = self
            .files
            .iter()
            .map(|file| {
                if file.as_os_str() == "-" {
                    RequirementsInput::Stdin
                } else {
                    RequirementsInput::File(file.clone())
                }
            })
            .collect();

        if let Some(repo) = &self.github {
            inputs.push(RequirementsInput::GitHub {
                repo: repo.clone(),
                branch: self.branch.clone(),
                path: self.path.clone(),
                token: self.token.clone(),
            });
        } else if let Some(url) = &self.url {
            inputs.push(RequirementsInput::Url(url.clone()));
        }

        if inputs.is_empty() {
            let default = Path::new(DEFAULT_REQUIREMENTS_FILE);
            if !default.is_file() {
                bail!("no requirements file given and ./{DEFAULT_REQUIREMENTS_FILE} does not exist");
            }
            inputs.push(RequirementsInput::File(default.to_path_buf()));
        }

        if self.verbatim && inputs.len() > 1 {
            bail!("--verbatim only allowed for single requirements files");
        }

        Ok(inputs)
    }

    fn report_options(&self) -> ReportOptions {
        ReportOptions {
            verbose: self.verbose || !(self.quiet || self.verbatim),
            outdated_only: self.outdated,
            latest: self.latest,
            verbatim: self.verbatim,
            delay_days: self.delay.map(i64::from),
        }
    }
}

/// Logs go to stderr, or to `log_file` through a non-blocking writer
fn init_logging(
    log_file: Option<&Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("invalid log file {}", path.display()))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .init();
            Ok(None)
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref())?;

    let config = Config::load(cli.config.as_deref())?;
    let options = RunOptions {
        inputs: cli.inputs()?,
        source: cli.source,
        report: cli.report_options(),
    };

    let summary = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let client = app::build_http_client(&config)?;
            let registries = app::create_default_registries(&config, &client);
            let remote =
                RemoteClient::with_client(&config.github.api_url, &config.github.raw_url, client);
            app::run(
                &config,
                &registries,
                &remote,
                &options,
                &mut std::io::stdout().lock(),
            )
            .await
        })?;

    Ok(if summary.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
