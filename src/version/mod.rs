//! Version layer: parsing, ordering and freshness of package releases
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Registry  │────▶│ ReleaseSet  │────▶│  Freshness  │
//! │   (fetch)   │     │  (dates)    │     │  (resolve)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                   │
//!        ▼                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registries │     │    Loose    │◀────│   Latest    │
//! │(pypi, conda)│     │(version cmp)│     │ (rule table)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`loose`]: `Version` parsing, ordering and the pre-release predicate
//! - [`types`]: `ReleaseSet`, the versions and release dates of one package
//! - [`latest`]: Latest stable version selection
//! - [`freshness`]: Pinned vs latest resolution and staleness
//! - [`registry`]: Registry trait for fetching release sets
//! - [`registries`]: Concrete registry implementations (PyPI, conda)
//! - [`error`]: Error types for registry operations

pub mod error;
pub mod freshness;
pub mod latest;
pub mod loose;
pub mod registries;
pub mod registry;
pub mod types;

pub use freshness::{Freshness, FreshnessStatus, ResolvedRelease, resolve};
pub use loose::{Version, compare, parse_version};
pub use types::ReleaseSet;
