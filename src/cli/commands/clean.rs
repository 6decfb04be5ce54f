//! CLI implementation for `kiln clean` command
//!
//! Removes object files and the executable from the output directory.

use std::time::Instant;

use anyhow::Result;

use super::Project;
use crate::cli::output::{status, OutputConfig};
use crate::core::clean::clean_project;
use crate::core::events::{BuildContext, BuildReporter};

/// Execute the clean command
pub fn execute(project: &Project, jobs: Option<usize>, output: &OutputConfig) -> Result<()> {
    let started = Instant::now();
    let reporter = output.reporter(&project.layout.root);
    let ctx = BuildContext::new(&reporter);

    let result = clean_project(&project.layout, project.workers(jobs), &ctx);
    match &result {
        Ok(cleaned) if cleaned.removed.is_empty() => {
            if !output.quiet {
                println!("{} Nothing to clean", status::SUCCESS);
            }
        }
        Ok(_) => reporter.result("Clean", true, started.elapsed()),
        Err(_) => reporter.result("Clean", false, started.elapsed()),
    }

    result?;
    Ok(())
}
