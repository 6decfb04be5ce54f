//! Output formatting and progress indicators
//!
//! This module provides the console reporter for build events and the
//! top-level error display.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use crate::core::events::BuildReporter;
use crate::core::plan::display_relative;
use crate::error::{KilnError, EXIT_FATAL};

/// Create a progress bar for compilation
pub fn create_build_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";
}

/// Global output flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything except errors
    pub quiet: bool,
    /// `-v` count
    pub verbose: u8,
}

impl OutputConfig {
    /// Create output settings from CLI flags
    pub fn new(quiet: bool, verbose: u8) -> Self {
        Self { quiet, verbose }
    }

    /// Default `tracing` filter directive for these flags
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            _ => "debug",
        }
    }

    /// Console reporter for a project rooted at `root`
    pub fn reporter(&self, root: &Path) -> ConsoleReporter {
        let progress_bar =
            !self.quiet && self.verbose == 0 && std::io::stderr().is_terminal();
        ConsoleReporter {
            root: root.to_path_buf(),
            quiet: self.quiet,
            progress_bar,
            bar: Mutex::new(None),
        }
    }
}

/// Reporter printing build progress to the terminal
///
/// On a terminal, compilation progress is drawn as a progress bar;
/// otherwise each file gets a `[i/n] Compiling` line.
#[derive(Debug)]
pub struct ConsoleReporter {
    root: PathBuf,
    quiet: bool,
    progress_bar: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    fn relative(&self, path: &Path) -> String {
        display_relative(&self.root, path)
    }

    /// Print a line, keeping any active progress bar intact
    fn print(&self, line: &str) {
        match self.bar.lock().as_ref() {
            Some(bar) => bar.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }

    fn eprint(&self, line: &str) {
        match self.bar.lock().as_ref() {
            Some(bar) => bar.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }

    fn finish_bar(&self) {
        if let Some(bar) = self.bar.lock().take() {
            bar.finish_and_clear();
        }
    }
}

impl BuildReporter for ConsoleReporter {
    fn compiling(&self, file: &Path, index: usize, total: usize) {
        if self.quiet {
            return;
        }
        let name = self.relative(file);
        if !self.progress_bar {
            println!("[{index}/{total}] Compiling {name}");
            return;
        }

        let mut guard = self.bar.lock();
        let bar = guard.get_or_insert_with(|| create_build_bar(total as u64));
        bar.set_message(name);
        bar.inc(1);
    }

    fn linking(&self, output: &Path, objects: &[PathBuf]) {
        self.finish_bar();
        if !self.quiet {
            println!(
                "Linking {} ({} objects)",
                self.relative(output),
                objects.len()
            );
        }
    }

    fn up_to_date(&self, output: &Path) {
        self.finish_bar();
        if !self.quiet {
            println!("{} {} is up to date", status::SUCCESS, self.relative(output));
        }
    }

    fn removing(&self, file: &Path, index: usize, total: usize) {
        if !self.quiet {
            println!("[{index}/{total}] Removing {}", self.relative(file));
        }
    }

    fn warning(&self, message: &str) {
        if !self.quiet {
            self.eprint(&format!("{} {message}", status::WARNING));
        }
    }

    fn error(&self, message: &str) {
        self.eprint(&format!("{} {message}", status::ERROR));
    }

    fn result(&self, command: &str, success: bool, elapsed: Duration) {
        self.finish_bar();
        let seconds = elapsed.as_secs_f64();
        if success {
            if !self.quiet {
                self.print(&format!(
                    "{} {command} succeeded in {seconds:.2}s",
                    status::SUCCESS
                ));
            }
        } else {
            self.eprint(&format!("{} {command} failed in {seconds:.2}s", status::ERROR));
        }
    }
}

/// Print a top-level error and return the process exit code for it
pub fn display_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    eprintln!("hint: run 'kiln --help' for usage");

    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<KilnError>())
        .map_or(EXIT_FATAL, KilnError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, ScanError, EXIT_EXECUTION};
    use anyhow::Context;

    #[test]
    fn test_log_level_from_flags() {
        assert_eq!(OutputConfig::new(false, 0).log_level(), "warn");
        assert_eq!(OutputConfig::new(false, 1).log_level(), "info");
        assert_eq!(OutputConfig::new(false, 3).log_level(), "debug");
        assert_eq!(OutputConfig::new(true, 2).log_level(), "error");
    }

    #[test]
    fn test_display_error_maps_exit_codes() {
        let compile: anyhow::Error = KilnError::from(BuildError::CompileFailed {
            failures: vec![],
            total: 2,
        })
        .into();
        assert_eq!(display_error(&compile), EXIT_EXECUTION);

        let root: anyhow::Result<()> = Err(KilnError::from(ScanError::RootNotFound {
            start: PathBuf::from("/tmp"),
        }))
        .context("Failed to load project");
        assert_eq!(display_error(&root.unwrap_err()), EXIT_FATAL);

        assert_eq!(display_error(&anyhow::anyhow!("unexpected")), EXIT_FATAL);
    }

    #[test]
    fn test_reporter_without_terminal_has_no_bar() {
        let reporter = OutputConfig::new(true, 0).reporter(Path::new("/p"));
        reporter.compiling(Path::new("/p/src/main.cpp"), 1, 1);
        assert!(reporter.bar.lock().is_none());
        assert_eq!(reporter.relative(Path::new("/p/src/main.cpp")), "src/main.cpp");
    }
}
