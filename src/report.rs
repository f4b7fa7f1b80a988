//! Console report of checked requirements

use std::io::{self, Write};

use crate::check::CheckOutcome;
use crate::parser::types::Requirement;
use crate::version::freshness::Freshness;

/// How much is printed per requirement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Print a status line for each requirement
    pub verbose: bool,
    /// Suppress "is up to date" lines
    pub outdated_only: bool,
    /// Print an updated pin for each out of date requirement
    pub latest: bool,
    /// Reproduce the requirements file, annotated with the latest versions
    pub verbatim: bool,
    /// Days a requirement may lag behind before the check fails
    pub delay_days: Option<i64>,
}

/// Aggregate of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Sum of staleness over every resolved requirement
    pub total_days: i64,
    /// Largest staleness of a single requirement
    pub max_days: i64,
    /// The requirements are too stale
    pub failed: bool,
}

/// Writes the report for a list of outcomes
pub struct Reporter {
    options: ReportOptions,
}

impl Reporter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn write<W: Write>(&self, out: &mut W, outcomes: &[CheckOutcome]) -> io::Result<Summary> {
        let mut summary = Summary::default();

        for outcome in outcomes {
            match outcome {
                CheckOutcome::Verbatim(line) => writeln!(out, "{line}")?,
                CheckOutcome::Ignored(requirement) => self.write_ignored(out, requirement)?,
                CheckOutcome::Resolved {
                    requirement,
                    freshness,
                } => match freshness.staleness_days() {
                    Some(days) => {
                        summary.total_days += days;
                        summary.max_days = summary.max_days.max(days);
                        self.write_resolved(out, requirement, freshness, days)?;
                    }
                    None => self.write_unresolved(out, requirement, freshness)?,
                },
                CheckOutcome::Failed { requirement, error } => {
                    if self.options.verbose {
                        writeln!(
                            out,
                            "{} ({}) could not be checked: {}",
                            requirement.name, requirement.version, error
                        )?;
                    }
                    self.write_error_pin(out, requirement)?;
                }
            }
        }

        summary.failed = self.write_summary(out, &summary)?;
        Ok(summary)
    }

    fn write_ignored<W: Write>(&self, out: &mut W, requirement: &Requirement) -> io::Result<()> {
        if self.options.verbatim {
            writeln!(out, "{}  # norot", pin(requirement, &requirement.version))
        } else {
            writeln!(out, "Ignoring updates for {}.", requirement.name)
        }
    }

    fn write_resolved<W: Write>(
        &self,
        out: &mut W,
        requirement: &Requirement,
        freshness: &Freshness,
        days: i64,
    ) -> io::Result<()> {
        let (Some(pinned), Some(latest)) = (&freshness.pinned, &freshness.latest) else {
            return Ok(());
        };
        let name = &requirement.name;

        if self.options.verbose {
            if days > 0 {
                writeln!(
                    out,
                    "{name} ({}) is {days} days out of date. Latest is {}",
                    requirement.version, latest.version
                )?;
            } else if !freshness.is_up_to_date() {
                writeln!(
                    out,
                    "{name} ({}) is out of date. Latest is {}",
                    requirement.version, latest.version
                )?;
            } else if !self.options.outdated_only {
                writeln!(out, "{name} ({}) is up to date", requirement.version)?;
            }
        }

        let differs = !freshness.is_up_to_date();
        if self.options.latest && differs {
            writeln!(
                out,
                "{}  # Updated from {}",
                pin(requirement, &latest.version),
                pinned.version
            )?;
        } else if self.options.verbatim && differs {
            writeln!(
                out,
                "{}  # Latest {}",
                pin(requirement, &pinned.version),
                latest.version
            )?;
        } else if self.options.verbatim {
            writeln!(out, "{}", pin(requirement, &pinned.version))?;
        }

        Ok(())
    }

    fn write_unresolved<W: Write>(
        &self,
        out: &mut W,
        requirement: &Requirement,
        freshness: &Freshness,
    ) -> io::Result<()> {
        if self.options.verbose {
            let source = requirement.source.display_name();
            if freshness.latest.is_none() {
                writeln!(
                    out,
                    "{} isn't on {source}. Check that the project still exists!",
                    requirement.name
                )?;
            } else {
                writeln!(
                    out,
                    "{} ({}) isn't available on {source} anymore!",
                    requirement.name, requirement.version
                )?;
            }
        }
        self.write_error_pin(out, requirement)
    }

    fn write_error_pin<W: Write>(&self, out: &mut W, requirement: &Requirement) -> io::Result<()> {
        if self.options.verbatim {
            writeln!(
                out,
                "{}  # Error checking latest version",
                pin(requirement, &requirement.version)
            )?;
        }
        Ok(())
    }

    /// Writes the closing line and returns whether the check failed
    fn write_summary<W: Write>(&self, out: &mut W, summary: &Summary) -> io::Result<bool> {
        let prefix = if self.options.verbatim {
            format!("# Generated with reqrot {}\n# ", env!("CARGO_PKG_VERSION"))
        } else {
            String::new()
        };

        match self.options.delay_days {
            None if summary.total_days > 0 => {
                writeln!(
                    out,
                    "{prefix}Your requirements are {} days out of date",
                    summary.total_days
                )?;
                Ok(true)
            }
            Some(delay) if summary.max_days > delay => {
                writeln!(
                    out,
                    "{prefix}At least one of your dependencies is {} days out of date \
                     which is more than the allowed {delay} days.",
                    summary.max_days
                )?;
                Ok(true)
            }
            Some(delay) => {
                writeln!(
                    out,
                    "{prefix}All of your dependencies are at most {delay} days out of date."
                )?;
                Ok(false)
            }
            None => {
                writeln!(
                    out,
                    "{prefix}Looks like you've been keeping up to date, \
                     time for a delicious beverage!"
                )?;
                Ok(false)
            }
        }
    }
}

/// Requirement line pinning `version`, in the source's own syntax
fn pin(requirement: &Requirement, version: &str) -> String {
    format!(
        "{}{}{}",
        requirement.name,
        requirement.source.pin_separator(),
        version
    )
}
