//! reqrot: how rotten are your requirements?
//!
//! Compares the release date of every pinned requirement with the release
//! date of the latest stable version of the same package.

pub mod app;
pub mod check;
pub mod config;
pub mod parser;
pub mod remote;
pub mod report;
pub mod version;
