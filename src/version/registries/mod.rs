//! Registry implementations for fetching release sets

pub mod conda;
pub mod pypi;

pub use conda::CondaRegistry;
pub use pypi::PypiRegistry;
