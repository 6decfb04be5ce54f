//! Build orchestration logic
//!
//! Compiles stale units on a worker pool, then links every object into the
//! executable. Linking only happens when every compile succeeded, and is
//! skipped only when nothing compiled and the plan reports the executable
//! current.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::events::BuildContext;
use crate::core::plan::BuildPlan;
use crate::core::workers::drain;
use crate::error::{BuildError, CompileFailure, KilnError};
use crate::infra::filesystem::{create_dir_all, modified};
use crate::infra::toolchain::Toolchain;

/// One translation unit to compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    /// Source file
    pub source: PathBuf,
    /// Object file to produce
    pub object: PathBuf,
}

/// Aggregated outcome of a compile phase
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Objects produced by successful compiles
    pub succeeded: BTreeSet<PathBuf>,
    /// Compiles that failed, sorted by source path
    pub failed: Vec<CompileFailure>,
    /// Number of jobs attempted
    pub total: usize,
}

impl BuildResult {
    /// Whether every job succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Combine fresh objects with `existing` ones for linking
    ///
    /// Fails with [`BuildError::CompileFailed`] if any job failed, so a
    /// partial object set can never reach the linker.
    pub fn into_link_inputs(self, existing: Vec<PathBuf>) -> Result<LinkInputs, BuildError> {
        if !self.failed.is_empty() {
            return Err(BuildError::CompileFailed {
                failures: self.failed,
                total: self.total,
            });
        }

        let mut objects = self.succeeded;
        objects.extend(existing);
        Ok(LinkInputs {
            objects: objects.into_iter().collect(),
        })
    }
}

/// Objects ready to link, deduplicated and sorted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInputs {
    objects: Vec<PathBuf>,
}

impl LinkInputs {
    /// Object files passed to the linker
    pub fn objects(&self) -> &[PathBuf] {
        &self.objects
    }
}

/// What a build did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Number of units compiled
    pub compiled: usize,
    /// Whether the linker ran
    pub linked: bool,
    /// Executable path
    pub executable: PathBuf,
}

/// Compile every job on up to `workers` threads
///
/// A failed job is recorded and its siblings keep running.
pub fn compile_units(
    jobs: Vec<CompileJob>,
    workers: usize,
    toolchain: &dyn Toolchain,
    ctx: &BuildContext<'_>,
) -> BuildResult {
    let total = jobs.len();
    let succeeded = Mutex::new(BTreeSet::new());
    let failed = Mutex::new(Vec::new());

    drain(jobs, workers, |job: CompileJob| {
        ctx.reporter()
            .compiling(&job.source, ctx.next_index(), total);

        match toolchain.compile(&job.source, &job.object) {
            Ok(()) => {
                succeeded.lock().insert(job.object);
            }
            Err(error) => {
                let failure = CompileFailure {
                    file: job.source,
                    error,
                };
                ctx.reporter().error(&failure.to_string());
                failed.lock().push(failure);
            }
        }
    });

    let mut failed = failed.into_inner();
    failed.sort_by(|a, b| a.file.cmp(&b.file));

    BuildResult {
        succeeded: succeeded.into_inner(),
        failed,
        total,
    }
}

/// Link `inputs` into `output`
pub fn link(
    inputs: &LinkInputs,
    output: &Path,
    toolchain: &dyn Toolchain,
    ctx: &BuildContext<'_>,
) -> Result<(), BuildError> {
    ctx.reporter().linking(output, inputs.objects());
    toolchain
        .link(inputs.objects(), output)
        .map_err(|error| BuildError::LinkFailed {
            output: output.to_path_buf(),
            error,
        })
}

/// Whether `executable` is missing or older than any of `objects`
pub fn needs_link(objects: &[PathBuf], executable: &Path) -> bool {
    let Some(linked_at) = modified(executable) else {
        return true;
    };
    objects
        .iter()
        .any(|object| modified(object).map_or(true, |time| linked_at < time))
}

/// Compile the stale units of `plan` and link the executable
pub fn build_project(
    plan: &BuildPlan,
    workers: usize,
    toolchain: &dyn Toolchain,
    ctx: &BuildContext<'_>,
) -> Result<BuildOutcome, KilnError> {
    let layout = &plan.layout;
    if !plan.has_sources() {
        let dirs = if layout.source_dirs.is_empty() {
            vec![layout.root.join(crate::infra::filesystem::SOURCE_DIR)]
        } else {
            layout.source_dirs.clone()
        };
        return Err(BuildError::NoSources { dirs }.into());
    }

    create_dir_all(&layout.output_dir)?;
    if let Some(parent) = layout.executable.parent() {
        create_dir_all(parent)?;
    }

    let jobs = plan.compile_jobs();
    tracing::info!("Compiling {} units with {workers} workers", jobs.len());
    let result = compile_units(jobs, workers, toolchain, ctx);
    let compiled = result.succeeded.len();
    let inputs = result.into_link_inputs(plan.current_objects())?;

    if compiled == 0 && !plan.needs_link() {
        tracing::info!("{} is up to date", layout.executable.display());
        ctx.reporter().up_to_date(&layout.executable);
        return Ok(BuildOutcome {
            compiled,
            linked: false,
            executable: layout.executable.clone(),
        });
    }

    link(&inputs, &layout.executable, toolchain, ctx)?;

    Ok(BuildOutcome {
        compiled,
        linked: true,
        executable: layout.executable.clone(),
    })
}
