//! Parser layer
//! - traits.rs: Parser trait definition
//! - types.rs: Common types (Requirement, RequirementEntry, Source)
//! - requirements_txt.rs: pip requirements.txt parser
//! - conda_export.rs: `conda list --export` parser

pub mod conda_export;
pub mod requirements_txt;
pub mod traits;
pub mod types;

pub use conda_export::CondaExportParser;
pub use requirements_txt::RequirementsTxtParser;
pub use traits::{ParseError, Parser};
pub use types::{Requirement, RequirementEntry, Source, detect_source};

/// Create the parser for a source
pub fn parser_for(source: Source, verbatim: bool) -> Box<dyn Parser> {
    match source {
        Source::PyPI => Box::new(RequirementsTxtParser::new(verbatim)),
        Source::Conda => Box::new(CondaExportParser::new(verbatim)),
    }
}
