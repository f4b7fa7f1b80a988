//! Parser trait definition

use std::path::{Path, PathBuf};

use crate::parser::types::{RequirementEntry, Source};

/// Trait for parsing requirements files
pub trait Parser: Send + Sync {
    /// Source every parsed requirement belongs to
    fn source(&self) -> Source;

    /// Extract requirement entries from file content
    ///
    /// Lines that are not pinned requirements never fail the parse; they are
    /// dropped, or kept as verbatim entries when the parser was built for
    /// verbatim output. `base_dir` is the directory of the parsed file and
    /// resolves includes; content fetched from a URL has none.
    fn parse(&self, content: &str, base_dir: Option<&Path>) -> Vec<RequirementEntry>;

    /// Read and parse a requirements file from disk
    fn parse_file(&self, path: &Path) -> Result<Vec<RequirementEntry>, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse(&content, path.parent()))
    }
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read a requirements file
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
