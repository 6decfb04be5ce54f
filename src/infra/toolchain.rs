//! Compiler and linker invocation
//!
//! The build coordinator only sees the [`Toolchain`] trait. The process
//! implementation composes argument vectors and runs the compiler driver
//! directly, without a shell.

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::core::config::BuildConfig;
use crate::error::ToolError;

/// Compiles translation units and links object files
///
/// Implementations are called from several worker threads at once.
pub trait Toolchain: Sync {
    /// Compile `source` into `object`
    fn compile(&self, source: &Path, object: &Path) -> Result<(), ToolError>;

    /// Link `objects` into the executable at `output`
    fn link(&self, objects: &[PathBuf], output: &Path) -> Result<(), ToolError>;
}

/// Toolchain that runs an external compiler driver such as `g++` or `clang++`
#[derive(Debug, Clone)]
pub struct ProcessToolchain {
    compiler: String,
    standard: String,
    flags: Vec<String>,
    link_flags: Vec<String>,
    include_dirs: Vec<PathBuf>,
}

impl ProcessToolchain {
    /// Create a toolchain from build settings and resolved include directories
    pub fn new(config: &BuildConfig, include_dirs: &[PathBuf]) -> Self {
        Self {
            compiler: config.compiler.clone(),
            standard: config.standard.clone(),
            flags: config.flags.clone(),
            link_flags: config.link_flags.clone(),
            include_dirs: include_dirs.to_vec(),
        }
    }

    /// Compiler driver program name
    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// Whether the compiler can be found on `PATH`
    pub fn is_available(&self) -> bool {
        which::which(&self.compiler).is_ok()
    }

    /// `<compiler> -std=<std> <flags> -I<dir>... -c <source> -o <object>`
    pub fn compile_command(&self, source: &Path, object: &Path) -> Command {
        let mut command = Command::new(&self.compiler);
        command
            .arg(format!("-std={}", self.standard))
            .args(&self.flags)
            .args(self.include_dirs.iter().map(|dir| {
                let mut arg = std::ffi::OsString::from("-I");
                arg.push(dir);
                arg
            }))
            .arg("-c")
            .arg(source)
            .arg("-o")
            .arg(object);
        command
    }

    /// `<compiler> -std=<std> <objects> <link_flags> -o <output>`
    pub fn link_command(&self, objects: &[PathBuf], output: &Path) -> Command {
        let mut command = Command::new(&self.compiler);
        command
            .arg(format!("-std={}", self.standard))
            .args(objects)
            .args(&self.link_flags)
            .arg("-o")
            .arg(output);
        command
    }

    fn execute(&self, mut command: Command) -> Result<(), ToolError> {
        tracing::debug!("$ {}", describe(&command));

        let output = command.output().map_err(|e| ToolError::Spawn {
            program: self.compiler.clone(),
            error: e.to_string(),
        })?;
        relay_diagnostics(&output);

        if output.status.success() {
            Ok(())
        } else {
            Err(ToolError::Exit {
                program: self.compiler.clone(),
                code: output.status.code(),
            })
        }
    }
}

impl Toolchain for ProcessToolchain {
    fn compile(&self, source: &Path, object: &Path) -> Result<(), ToolError> {
        self.execute(self.compile_command(source, object))
    }

    fn link(&self, objects: &[PathBuf], output: &Path) -> Result<(), ToolError> {
        self.execute(self.link_command(objects, output))
    }
}

/// Render a command line for logging
pub fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Forward compiler output in one write per stream so parallel diagnostics
/// stay intact
fn relay_diagnostics(output: &Output) {
    let mut result = Ok(());
    if !output.stdout.is_empty() {
        result = std::io::stdout().lock().write_all(&output.stdout);
    }
    if !output.stderr.is_empty() {
        result = result.and(std::io::stderr().lock().write_all(&output.stderr));
    }
    if let Err(e) = result {
        tracing::warn!("Failed to forward compiler output: {e}");
    }
}
