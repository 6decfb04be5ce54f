//! Clean logic
//!
//! Removes object files and the executable from the output directory. Only
//! the filesystem scan is needed, so a project with an include cycle can
//! still be cleaned.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use walkdir::WalkDir;

use crate::core::events::BuildContext;
use crate::core::plan::ProjectLayout;
use crate::core::workers::drain;
use crate::error::{FilesystemError, KilnError};
use crate::infra::filesystem::{remove_file, scan_objects};

/// Result of clean operation
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanResult {
    /// Files that were removed, sorted
    pub removed: Vec<PathBuf>,
    /// Whether the emptied output directory was removed as well
    pub removed_output_dir: bool,
}

/// Build artifacts currently on disk: objects, then the executable
pub fn find_artifacts(layout: &ProjectLayout) -> Vec<PathBuf> {
    let mut artifacts = scan_objects(&layout.output_dir);
    if layout.executable.is_file() {
        artifacts.push(layout.executable.clone());
    }
    artifacts
}

/// Remove build artifacts on up to `workers` threads
///
/// Every removal is attempted; failures are collected into
/// [`KilnError::Clean`].
pub fn clean_project(
    layout: &ProjectLayout,
    workers: usize,
    ctx: &BuildContext<'_>,
) -> Result<CleanResult, KilnError> {
    let artifacts = find_artifacts(layout);
    let total = artifacts.len();
    let removed = Mutex::new(Vec::new());
    let failed = Mutex::new(Vec::new());

    drain(artifacts, workers, |path: PathBuf| {
        ctx.reporter().removing(&path, ctx.next_index(), total);
        match remove_file(&path) {
            Ok(()) => removed.lock().push(path),
            Err(e) => {
                ctx.reporter().error(&e.to_string());
                failed.lock().push(e);
            }
        }
    });

    let failed: Vec<FilesystemError> = failed.into_inner();
    if !failed.is_empty() {
        return Err(KilnError::Clean(failed));
    }

    let mut removed = removed.into_inner();
    removed.sort();

    Ok(CleanResult {
        removed,
        removed_output_dir: remove_if_empty(&layout.output_dir),
    })
}

/// Remove `dir` once it holds nothing, pruning emptied subdirectories first
fn remove_if_empty(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }

    let subdirs = WalkDir::new(dir)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir());
    for entry in subdirs {
        // Directories still holding files fail here and stay
        if std::fs::remove_dir(entry.path()).is_ok() {
            tracing::debug!("Removed empty directory {}", entry.path().display());
        }
    }

    let is_empty = std::fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none());
    if !is_empty {
        return false;
    }
    match std::fs::remove_dir(dir) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Keeping {}: {e}", dir.display());
            false
        }
    }
}
