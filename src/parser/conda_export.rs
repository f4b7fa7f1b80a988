//! `conda list --export` parser
//!
//! Format examples:
//! - Pin with build: `numpy=1.21.2=py39h20f2e39_0`
//! - Pin without build: `numpy=1.21.2`
//! - Ignored: `python=3.9.7=h12debd9_1  # norot`
//! - Header: `# platform: linux-64`

use std::path::Path;

use regex::Regex;

use crate::config::IGNORE_MARKER;
use crate::parser::traits::Parser;
use crate::parser::types::{Requirement, RequirementEntry, Source};

/// Parser for conda package specification files
pub struct CondaExportParser {
    /// Keep non-requirement lines as verbatim entries
    verbatim: bool,
    /// Regex for `name=version[=build]`
    spec_re: Regex,
}

impl CondaExportParser {
    pub fn new(verbatim: bool) -> Self {
        Self {
            verbatim,
            spec_re: Regex::new(
                r"^(?P<package>[A-Za-z0-9_.\-]+)={1,2}(?P<version>[^=\s]+)(?:=(?P<build>[^=\s]+))?$",
            )
            .unwrap(),
        }
    }
}

impl Default for CondaExportParser {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Parser for CondaExportParser {
    fn source(&self) -> Source {
        Source::Conda
    }

    fn parse(&self, content: &str, _base_dir: Option<&Path>) -> Vec<RequirementEntry> {
        let mut entries = Vec::new();

        for line in content.lines() {
            let without_comment = line.split('#').next().unwrap_or_default().trim();

            match self.spec_re.captures(without_comment) {
                Some(caps) => {
                    let version = match caps.name("build") {
                        Some(build) => format!("{}={}", &caps["version"], build.as_str()),
                        None => caps["version"].to_string(),
                    };
                    entries.push(RequirementEntry::Package(Requirement {
                        source: Source::Conda,
                        name: caps["package"].to_string(),
                        version,
                        ignore: line.trim().ends_with(IGNORE_MARKER),
                    }));
                }
                None if self.verbatim => entries.push(RequirementEntry::Verbatim {
                    line: line.to_string(),
                }),
                None => {}
            }
        }

        entries
    }
}
