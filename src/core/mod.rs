//! Core business logic module
//!
//! This module contains the build pipeline for kiln. Process spawning and
//! directory walking belong in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`classify`] - File kinds and path string helpers
//! - [`include`] - Local `#include` extraction
//! - [`graph`] - Include dependency graph and topological sort
//! - [`unit`] - Compile units grouped by filename stem
//! - [`staleness`] - Timestamp-based recompilation decisions
//! - [`plan`] - Discovery and planning before a build
//! - [`workers`] - Scoped worker pool
//! - [`builder`] - Parallel compilation and linking
//! - [`clean`] - Build artifact removal
//! - [`run`] - Running the built executable
//! - [`check`] - Build preview without compiling
//! - [`config`] - `kiln.toml` parsing and validation
//! - [`events`] - Build progress reporting

pub mod builder;
pub mod check;
pub mod classify;
pub mod clean;
pub mod config;
pub mod events;
pub mod graph;
pub mod include;
pub mod plan;
pub mod run;
pub mod staleness;
pub mod unit;
pub mod workers;
