//! Build planning
//!
//! Ties discovery, graph construction, ordering and staleness evaluation
//! together. A [`BuildPlan`] is computed before any compiler runs, so a cycle
//! or unreadable file aborts the invocation without side effects.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::thread;

use crate::config::defaults::DEFAULT_BUILD_DIR;
use crate::core::builder::{needs_link, CompileJob};
use crate::core::config::ProjectConfig;
use crate::core::events::BuildReporter;
use crate::core::graph::{build_graph, DependencyGraph, NodeId};
use crate::core::staleness::{staleness, StaleReason};
use crate::core::unit::{UnitId, UnitSet};
use crate::error::KilnError;
use crate::infra::filesystem::{
    find_include_dir, find_output_dir, find_source_dir, scan_headers, scan_objects, scan_sources,
    Scanned,
};

/// Where a project's inputs and outputs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root
    pub root: PathBuf,
    /// Directories scanned for sources
    pub source_dirs: Vec<PathBuf>,
    /// Directories scanned for headers and passed as `-I`
    pub include_dirs: Vec<PathBuf>,
    /// Directory receiving objects and the executable
    pub output_dir: PathBuf,
    /// Linked executable
    pub executable: PathBuf,
}

impl ProjectLayout {
    /// Resolve directories against `root`
    ///
    /// Unconfigured source and include directories fall back to `src` and
    /// `include` when they exist. The output directory is the configured
    /// one, else an existing `out` or `build`, else `build`.
    pub fn resolve(root: &Path, config: &ProjectConfig) -> Self {
        let build = &config.build;
        let resolve_dirs = |configured: &[PathBuf], fallback: Option<PathBuf>| -> Vec<PathBuf> {
            if configured.is_empty() {
                fallback.into_iter().collect()
            } else {
                configured.iter().map(|dir| root.join(dir)).collect()
            }
        };

        let output_dir = build
            .build_dir
            .as_ref()
            .map(|dir| root.join(dir))
            .or_else(|| find_output_dir(root))
            .unwrap_or_else(|| root.join(DEFAULT_BUILD_DIR));

        Self {
            root: root.to_path_buf(),
            source_dirs: resolve_dirs(&build.source_dirs, find_source_dir(root)),
            include_dirs: resolve_dirs(&build.include_dirs, find_include_dir(root)),
            executable: output_dir.join(&build.executable),
            output_dir,
        }
    }
}

/// Files found by scanning a [`ProjectLayout`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectFiles {
    /// Source files, sorted per directory
    pub sources: Vec<PathBuf>,
    /// Header files, sorted per directory
    pub headers: Vec<PathBuf>,
    /// Object files in the output directory
    pub objects: Vec<PathBuf>,
    /// Headers under source directories and sources under include directories
    pub misplaced: Vec<PathBuf>,
}

impl ProjectFiles {
    /// Scan sources, headers and objects concurrently
    pub fn discover(layout: &ProjectLayout) -> Self {
        let (sources, headers, objects) = thread::scope(|scope| {
            let sources = scope.spawn(|| scan_all(&layout.source_dirs, scan_sources));
            let headers = scope.spawn(|| scan_all(&layout.include_dirs, scan_headers));
            let objects = scope.spawn(|| scan_objects(&layout.output_dir));
            (
                join(sources.join()),
                join(headers.join()),
                join(objects.join()),
            )
        });

        let mut misplaced = sources.misplaced;
        misplaced.extend(headers.misplaced);

        Self {
            sources: sources.files,
            headers: headers.files,
            objects,
            misplaced,
        }
    }
}

fn scan_all(dirs: &[PathBuf], scan: fn(&Path) -> Scanned) -> Scanned {
    let mut seen = BTreeSet::new();
    let mut all = Scanned::default();
    for dir in dirs {
        let scanned = scan(dir);
        all.files
            .extend(scanned.files.into_iter().filter(|f| seen.insert(f.clone())));
        all.misplaced.extend(scanned.misplaced);
    }
    all
}

fn join<T>(result: thread::Result<T>) -> T {
    result.unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

/// Everything known about a project before compiling
#[derive(Debug, Clone)]
pub struct BuildPlan {
    /// Resolved directories
    pub layout: ProjectLayout,
    /// Scan results
    pub files: ProjectFiles,
    /// Include graph
    pub graph: DependencyGraph,
    /// Graph nodes, dependencies first
    pub order: Vec<NodeId>,
    /// Compile units in build order
    pub units: UnitSet,
    /// Units needing recompilation, in build order
    pub stale: Vec<(UnitId, StaleReason)>,
}

impl BuildPlan {
    /// Scan the project and evaluate which units are stale
    ///
    /// Misplaced files, duplicate stems and objects without a source are
    /// reported as warnings.
    pub fn create(layout: ProjectLayout, reporter: &dyn BuildReporter) -> Result<Self, KilnError> {
        let files = ProjectFiles::discover(&layout);
        for path in &files.misplaced {
            reporter.warning(&format!(
                "Ignoring misplaced file {}",
                display_relative(&layout.root, path)
            ));
        }
        tracing::info!(
            "Found {} sources, {} headers, {} objects",
            files.sources.len(),
            files.headers.len(),
            files.objects.len()
        );

        let graph = build_graph(&files.sources, &files.headers)?;
        let order = graph.topological_sort()?;
        let units = UnitSet::assemble(&graph, &order, &files.objects, &mut |message| {
            reporter.warning(&message);
        });

        let stale: Vec<(UnitId, StaleReason)> = units
            .iter()
            .filter_map(|(id, unit)| staleness(unit, &units).map(|reason| (id, reason)))
            .collect();
        for (id, reason) in &stale {
            tracing::debug!("{} is stale: {reason}", units.get(*id).stem);
        }
        tracing::info!("{} of {} units need compiling", stale.len(), units.len());

        let plan = Self {
            layout,
            files,
            graph,
            order,
            units,
            stale,
        };
        for object in plan.orphan_objects() {
            reporter.warning(&format!(
                "Not linking {}: no matching source",
                display_relative(&plan.layout.root, &object)
            ));
        }
        Ok(plan)
    }

    /// Compile jobs for the stale units, in build order
    pub fn compile_jobs(&self) -> Vec<CompileJob> {
        self.stale
            .iter()
            .filter_map(|(id, _)| {
                let unit = self.units.get(*id);
                unit.source.as_ref().map(|source| CompileJob {
                    source: source.clone(),
                    object: unit.object_target(&self.layout.output_dir),
                })
            })
            .collect()
    }

    /// Objects of up-to-date units that belong in the link
    ///
    /// Objects whose source no longer exists are left out.
    pub fn current_objects(&self) -> Vec<PathBuf> {
        let stale: BTreeSet<UnitId> = self.stale.iter().map(|(id, _)| *id).collect();
        self.units
            .iter()
            .filter(|(id, unit)| unit.source.is_some() && !stale.contains(id))
            .filter_map(|(_, unit)| unit.object.clone())
            .collect()
    }

    /// Objects in the output directory that no source will be linked from
    ///
    /// Their presence means the executable may still contain code whose
    /// source was removed, so a build relinks while any remain.
    pub fn orphan_objects(&self) -> Vec<PathBuf> {
        let linked: BTreeSet<&Path> = self
            .units
            .iter()
            .filter(|(_, unit)| unit.source.is_some())
            .filter_map(|(_, unit)| unit.object.as_deref())
            .collect();
        self.files
            .objects
            .iter()
            .filter(|object| !linked.contains(object.as_path()))
            .cloned()
            .collect()
    }

    /// Whether the executable must be relinked even if nothing compiles
    pub fn needs_link(&self) -> bool {
        !self.orphan_objects().is_empty()
            || needs_link(&self.current_objects(), &self.layout.executable)
    }

    /// Whether the project has any translation unit
    pub fn has_sources(&self) -> bool {
        !self.files.sources.is_empty()
    }

    /// Graph files in build order
    pub fn build_order(&self) -> impl Iterator<Item = &Path> {
        self.order.iter().map(|&id| self.graph.node(id).path())
    }
}

/// `path` relative to `root` when it lies inside it
pub fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
