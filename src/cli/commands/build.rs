//! Build command implementation
//!
//! Implements `kiln build` to compile stale sources and link the executable.

use std::time::Instant;

use anyhow::Result;

use super::Project;
use crate::cli::output::OutputConfig;
use crate::core::builder::{build_project, BuildOutcome};
use crate::core::events::{BuildContext, BuildReporter};
use crate::core::plan::BuildPlan;
use crate::error::KilnError;

/// Execute the build command
pub fn execute(project: &Project, jobs: Option<usize>, output: &OutputConfig) -> Result<BuildOutcome> {
    let started = Instant::now();
    let reporter = output.reporter(&project.layout.root);

    let result = build(project, jobs, &reporter);
    reporter.result("Build", result.is_ok(), started.elapsed());
    Ok(result?)
}

/// Plan, compile and link, reporting progress to `reporter`
pub fn build(
    project: &Project,
    jobs: Option<usize>,
    reporter: &dyn BuildReporter,
) -> Result<BuildOutcome, KilnError> {
    let plan = BuildPlan::create(project.layout.clone(), reporter)?;
    let workers = project.workers(jobs);
    let toolchain = project.toolchain();
    let ctx = BuildContext::new(reporter);

    build_project(&plan, workers, &toolchain, &ctx)
}
