//! kiln - Incremental build orchestrator for C and C++ projects
//!
//! This library scans a project for sources and headers, orders them by
//! their local `#include` dependencies, decides which translation units are
//! stale from file timestamps, and drives a parallel compile followed by a
//! single link through an external compiler driver.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic: graph, staleness, build coordination
//! - [`infra`] - Infrastructure layer (filesystem, compiler processes)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
