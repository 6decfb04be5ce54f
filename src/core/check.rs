//! Check command logic
//!
//! Runs the planning pipeline without compiling and reports what a build
//! would do.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::events::{BuildEvent, EventLog};
use crate::core::graph::UnresolvedInclude;
use crate::core::plan::{BuildPlan, ProjectLayout};
use crate::core::staleness::StaleReason;
use crate::error::KilnError;
use crate::infra::toolchain::ProcessToolchain;

/// A unit the next build would compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleUnit {
    /// Source file
    pub source: PathBuf,
    /// Object the compile would produce
    pub object: PathBuf,
    /// Why it is stale
    pub reason: StaleReason,
}

/// Result of the check operation
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Project root
    pub root: PathBuf,
    /// Configured compiler driver
    pub compiler: String,
    /// Whether the compiler was found on `PATH`
    pub compiler_available: bool,
    /// Executable the build links
    pub executable: PathBuf,
    /// Sources and headers, dependencies first
    pub build_order: Vec<PathBuf>,
    /// Number of compile units
    pub units: usize,
    /// Units that would be compiled, in build order
    pub stale: Vec<StaleUnit>,
    /// Local includes that match no header, or several
    pub unresolved: Vec<UnresolvedInclude>,
    /// Warnings raised while planning
    pub warnings: Vec<String>,
    /// Whether a build would neither compile nor link
    pub up_to_date: bool,
}

/// Plan a build of `layout` and describe it
pub fn check_project(
    layout: ProjectLayout,
    toolchain: &ProcessToolchain,
) -> Result<CheckReport, KilnError> {
    let log = EventLog::new();
    let plan = BuildPlan::create(layout, &log)?;

    let stale: Vec<StaleUnit> = plan
        .compile_jobs()
        .into_iter()
        .zip(plan.stale.iter())
        .map(|(job, (_, reason))| StaleUnit {
            source: job.source,
            object: job.object,
            reason: reason.clone(),
        })
        .collect();

    let up_to_date = stale.is_empty() && plan.has_sources() && !plan.needs_link();

    let warnings = log
        .events()
        .into_iter()
        .filter_map(|event| match event {
            BuildEvent::Warning(message) => Some(message),
            _ => None,
        })
        .collect();

    Ok(CheckReport {
        root: plan.layout.root.clone(),
        compiler: toolchain.compiler().to_string(),
        compiler_available: toolchain.is_available(),
        executable: plan.layout.executable.clone(),
        build_order: plan.build_order().map(PathBuf::from).collect(),
        units: plan.units.len(),
        stale,
        unresolved: plan.graph.unresolved().to_vec(),
        warnings,
        up_to_date,
    })
}
