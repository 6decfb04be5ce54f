//! Filesystem operations
//!
//! Project root discovery, recursive file enumeration, and the small set of
//! directory/file helpers the build and clean steps need.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::core::classify::{is_header, is_object, is_source};
use crate::error::{FilesystemError, ScanError};

/// Directory holding translation units
pub const SOURCE_DIR: &str = "src";

/// Directory holding project headers
pub const INCLUDE_DIR: &str = "include";

/// Output directory names, in lookup order
pub const OUTPUT_DIRS: &[&str] = &["out", "build"];

/// Files found by a directory scan
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scanned {
    /// Files matching the requested kind
    pub files: Vec<PathBuf>,
    /// Files of the opposite kind found in the wrong directory
    pub misplaced: Vec<PathBuf>,
}

/// Walk upward from `start` to the first directory containing `src` or
/// `include`
pub fn find_root(start: &Path) -> Result<PathBuf, ScanError> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| ScanError::InvalidStart {
                path: start.to_path_buf(),
                error: e.to_string(),
            })?
            .join(start)
    };

    let mut current = start.as_path();
    loop {
        if current.join(SOURCE_DIR).is_dir() || current.join(INCLUDE_DIR).is_dir() {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return Err(ScanError::RootNotFound { start }),
        }
    }
}

/// `root/src` if present
pub fn find_source_dir(root: &Path) -> Option<PathBuf> {
    existing_dir(root.join(SOURCE_DIR))
}

/// `root/include` if present
pub fn find_include_dir(root: &Path) -> Option<PathBuf> {
    existing_dir(root.join(INCLUDE_DIR))
}

/// `root/out` or `root/build`, whichever exists first
pub fn find_output_dir(root: &Path) -> Option<PathBuf> {
    OUTPUT_DIRS
        .iter()
        .find_map(|name| existing_dir(root.join(name)))
}

fn existing_dir(path: PathBuf) -> Option<PathBuf> {
    path.is_dir().then_some(path)
}

/// Recursively collect regular files under `dir` accepted by `predicate`
///
/// Results are sorted by path so scans are reproducible. A missing `dir`
/// yields nothing.
pub fn enumerate_files<P>(dir: &Path, predicate: P) -> Vec<PathBuf>
where
    P: Fn(&Path) -> bool,
{
    let mut files = Vec::new();
    if !dir.is_dir() {
        return files;
    }

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {e}", dir.display());
                continue;
            }
        };
        if entry.file_type().is_file() && predicate(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files
}

/// Collect source files under a source directory
///
/// Headers found here are reported as misplaced and left out of the build.
pub fn scan_sources(dir: &Path) -> Scanned {
    Scanned {
        files: enumerate_files(dir, is_source),
        misplaced: enumerate_files(dir, is_header),
    }
}

/// Collect header files under an include directory
///
/// Sources found here are reported as misplaced and left out of the build.
pub fn scan_headers(dir: &Path) -> Scanned {
    Scanned {
        files: enumerate_files(dir, is_header),
        misplaced: enumerate_files(dir, is_source),
    }
}

/// Collect object files under an output directory
pub fn scan_objects(dir: &Path) -> Vec<PathBuf> {
    enumerate_files(dir, is_object)
}

/// Last modification time, or `None` if the file is missing or unreadable
pub fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a single file
pub fn remove_file(path: &Path) -> Result<(), FilesystemError> {
    std::fs::remove_file(path).map_err(|e| FilesystemError::RemoveFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
