//! Error types for kiln
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Project discovery errors
#[derive(Error, Debug)]
pub enum ScanError {
    /// No `src` or `include` directory found walking upward
    #[error("No project root found from '{start}' (looked for a 'src' or 'include' directory)")]
    RootNotFound { start: PathBuf },

    /// Start directory could not be resolved
    #[error("Cannot resolve start directory '{path}': {error}")]
    InvalidStart { path: PathBuf, error: String },
}

/// Dependency graph errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// The include graph is not a DAG
    #[error("Circular include detected among: {}", display_paths(files))]
    CycleDetected { files: Vec<PathBuf> },

    /// A discovered file could not be read for include extraction
    #[error("Failed to read '{path}' for includes: {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Failure reported by the external compiler or linker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Tool ran and exited unsuccessfully
    #[error("'{program}' exited with {}", display_code(*code))]
    Exit { program: String, code: Option<i32> },

    /// Tool could not be started
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },
}

/// A single translation unit that failed to compile
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to compile '{}': {error}", file.display())]
pub struct CompileFailure {
    /// Source file that was being compiled
    pub file: PathBuf,
    /// What the compiler reported
    pub error: ToolError,
}

/// Build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// One or more units failed to compile; linking was skipped
    #[error("{} of {total} source files failed to compile:\n{}", failures.len(), display_failures(failures))]
    CompileFailed {
        failures: Vec<CompileFailure>,
        total: usize,
    },

    /// Link step failed after all compiles succeeded
    #[error("Failed to link '{}': {error}", output.display())]
    LinkFailed { output: PathBuf, error: ToolError },

    /// The project has no source files to build
    #[error("No source files found under {}", display_paths(dirs))]
    NoSources { dirs: Vec<PathBuf> },
}

/// Errors running the produced executable
#[derive(Error, Debug)]
pub enum RunError {
    /// Executable has not been built
    #[error("No executable found at '{}', build your project to create one", path.display())]
    MissingExecutable { path: PathBuf },

    /// Executable could not be started
    #[error("Failed to run '{}': {error}", path.display())]
    Spawn { path: PathBuf, error: String },

    /// Executable exited unsuccessfully
    #[error("'{}' exited with {}", path.display(), display_code(*code))]
    Exit { path: PathBuf, code: Option<i32> },
}

/// Project configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Configuration value out of range
    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove a file
    #[error("Failed to remove '{path}': {error}")]
    RemoveFile { path: PathBuf, error: String },
}

/// Top-level kiln error type
#[derive(Error, Debug)]
pub enum KilnError {
    /// Project discovery error
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Dependency graph error
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Build error
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Run error
    #[error(transparent)]
    Run(#[from] RunError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Several removals failed during clean
    #[error("Failed to remove {} build artifacts:\n{}", .0.len(), display_errors(.0))]
    Clean(Vec<FilesystemError>),
}

/// Process exit code for a failed compile, link or run
pub const EXIT_EXECUTION: i32 = 1;

/// Process exit code for invalid usage (matches clap)
pub const EXIT_USAGE: i32 = 2;

/// Process exit code for structural or unexpected errors
pub const EXIT_FATAL: i32 = 3;

impl KilnError {
    /// Exit code that distinguishes execution failures from fatal errors
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Build(BuildError::CompileFailed { .. } | BuildError::LinkFailed { .. })
            | Self::Run(_)
            | Self::Clean(_) => EXIT_EXECUTION,
            _ => EXIT_FATAL,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn display_failures(failures: &[CompileFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn display_errors(errors: &[FilesystemError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
