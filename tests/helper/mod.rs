//! Shared utilities for integration tests

#![allow(dead_code)]

pub mod registry;

pub use registry::*;
