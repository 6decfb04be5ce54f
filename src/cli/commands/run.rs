//! Run command implementation
//!
//! Implements `kiln run` to build and then execute the program.

use std::time::Instant;

use anyhow::Result;

use super::{build, Project};
use crate::cli::output::OutputConfig;
use crate::core::events::BuildReporter;
use crate::core::run::run_executable;

/// Execute the run command
pub fn execute(
    project: &Project,
    jobs: Option<usize>,
    args: &[String],
    output: &OutputConfig,
) -> Result<()> {
    let outcome = build::execute(project, jobs, output)?;

    let started = Instant::now();
    let reporter = output.reporter(&project.layout.root);
    let result = run_executable(&outcome.executable, args);
    reporter.result("Run", result.is_ok(), started.elapsed());
    Ok(result?)
}
