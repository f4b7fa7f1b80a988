//! requirements.txt parser
//!
//! Extracts exact pins (`name==version`, `name[extra]==version`) and follows
//! `-r other.txt` includes relative to the including file.
//!
//! Format examples:
//! - Pin: `requests==2.32.0`
//! - Extras and markers: `requests[socks]==2.32.0 ; python_version >= "3.8"`
//! - Ignored: `django==1.11.29  # norot`
//! - Include: `-r base.txt`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::warn;

use crate::config::IGNORE_MARKER;
use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::{Requirement, RequirementEntry, Source};

/// Parser for pip requirements files
pub struct RequirementsTxtParser {
    /// Keep non-requirement lines as verbatim entries
    verbatim: bool,
    /// Regex for a pinned requirement: `name[extras]==version`
    requirement_re: Regex,
}

impl RequirementsTxtParser {
    pub fn new(verbatim: bool) -> Self {
        Self {
            verbatim,
            requirement_re: Regex::new(
                r"^\s*(?P<package>[^\s\[\]]+)(?P<extras>\[\S+\])?==(?P<version>[^\s;]+)",
            )
            .unwrap(),
        }
    }

    fn parse_into(
        &self,
        content: &str,
        base_dir: Option<&Path>,
        visited: &mut HashSet<PathBuf>,
        entries: &mut Vec<RequirementEntry>,
    ) {
        for line in content.lines() {
            let without_comment = line.split('#').next().unwrap_or_default().trim();
            let ignore = line.trim().ends_with(IGNORE_MARKER);

            if let Some(caps) = self.requirement_re.captures(without_comment) {
                entries.push(RequirementEntry::Package(Requirement {
                    source: Source::PyPI,
                    name: caps["package"].to_string(),
                    version: caps["version"].to_string(),
                    ignore,
                }));
            } else if let Some(include) = include_target(without_comment) {
                let Some(base_dir) = base_dir else {
                    warn!("Recursive requirements are not supported in URL based lookups");
                    continue;
                };

                if self.verbatim {
                    entries.push(RequirementEntry::Verbatim {
                        line: line.to_string(),
                    });
                }

                let path = base_dir.join(include);
                let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
                if !visited.insert(key) {
                    warn!("Skipping {}: already included", path.display());
                    continue;
                }

                match std::fs::read_to_string(&path) {
                    Ok(included) => {
                        let included_dir = path.parent().unwrap_or(base_dir);
                        self.parse_into(&included, Some(included_dir), visited, entries);
                    }
                    Err(e) => warn!("Failed to import {}: {}", include, e),
                }
            } else if self.verbatim {
                entries.push(RequirementEntry::Verbatim {
                    line: line.to_string(),
                });
            }
        }
    }
}

impl Default for RequirementsTxtParser {
    fn default() -> Self {
        Self::new(false)
    }
}

/// File named by an include directive (`-r file`, `-rfile`, `--requirement file`)
fn include_target(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("--requirement")
        .or_else(|| line.strip_prefix("-r"))?;
    let target = rest.trim_start_matches('=').trim();
    (!target.is_empty()).then_some(target)
}

impl Parser for RequirementsTxtParser {
    fn source(&self) -> Source {
        Source::PyPI
    }

    fn parse(&self, content: &str, base_dir: Option<&Path>) -> Vec<RequirementEntry> {
        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        self.parse_into(content, base_dir, &mut visited, &mut entries);
        entries
    }

    /// The file itself counts as visited, so includes never re-enter it
    fn parse_file(&self, path: &Path) -> Result<Vec<RequirementEntry>, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
        self.parse_into(&content, path.parent(), &mut visited, &mut entries);
        Ok(entries)
    }
}
