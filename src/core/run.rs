//! Running the built executable

use std::path::Path;
use std::process::Command;

use crate::error::RunError;

/// Run `executable` with `args`, inheriting the terminal
///
/// Returns once the program exits; a non-zero status is an error.
pub fn run_executable(executable: &Path, args: &[String]) -> Result<(), RunError> {
    if !executable.is_file() {
        return Err(RunError::MissingExecutable {
            path: executable.to_path_buf(),
        });
    }

    tracing::debug!("$ {} {}", executable.display(), args.join(" "));
    let status = Command::new(executable)
        .args(args)
        .status()
        .map_err(|e| RunError::Spawn {
            path: executable.to_path_buf(),
            error: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(RunError::Exit {
            path: executable.to_path_buf(),
            code: status.code(),
        })
    }
}
