//! Common types for parsers

use std::path::Path;

/// Ecosystem a requirement is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Python Package Index (requirements.txt)
    PyPI,
    /// conda channels (`conda list --export`)
    Conda,
}

impl Source {
    /// Returns the string representation of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PyPI => "pypi",
            Source::Conda => "conda",
        }
    }

    /// Human readable name used in report messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::PyPI => "PyPI",
            Source::Conda => "conda",
        }
    }

    /// Separator between name and version in a pinned requirement line
    pub fn pin_separator(&self) -> &'static str {
        match self {
            Source::PyPI => "==",
            Source::Conda => "=",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pypi" | "pip" => Ok(Source::PyPI),
            "conda" => Ok(Source::Conda),
            other => Err(format!("unknown source '{other}' (expected pypi or conda)")),
        }
    }
}

/// Detect the source of a requirements file from its name
pub fn detect_source(path: &Path) -> Source {
    let is_conda = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_ascii_lowercase().contains("conda"));

    if is_conda { Source::Conda } else { Source::PyPI }
}

/// A pinned package found in a requirements file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Source the package is resolved against
    pub source: Source,
    /// Package name (e.g., "requests")
    pub name: String,
    /// Pinned version (e.g., "2.32.0", or "1.21.2=py39_0" for conda builds)
    pub version: String,
    /// Marked `# norot`: never checked for updates
    pub ignore: bool,
}

/// One entry of a parsed requirements file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementEntry {
    /// A pinned package
    Package(Requirement),
    /// A line kept as-is for verbatim output (comments, includes, unpinned specs)
    Verbatim { line: String },
}

impl RequirementEntry {
    pub fn as_requirement(&self) -> Option<&Requirement> {
        match self {
            RequirementEntry::Package(requirement) => Some(requirement),
            RequirementEntry::Verbatim { .. } => None,
        }
    }
}
