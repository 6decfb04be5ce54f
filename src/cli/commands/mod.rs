//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod check;
pub mod clean;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::output::OutputConfig;
use crate::core::config::ProjectConfig;
use crate::core::plan::ProjectLayout;
use crate::core::workers::default_workers;
use crate::error::KilnError;
use crate::infra::filesystem::find_root;
use crate::infra::toolchain::ProcessToolchain;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile stale sources and link the executable
    Build {
        /// Number of parallel jobs
        #[arg(short, long, value_parser = parse_jobs)]
        jobs: Option<usize>,
    },

    /// Build, then run the executable
    Run {
        /// Number of parallel jobs
        #[arg(short, long, value_parser = parse_jobs)]
        jobs: Option<usize>,

        /// Arguments passed to the executable
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Remove object files and the executable
    Clean {
        /// Number of parallel jobs
        #[arg(short, long, value_parser = parse_jobs)]
        jobs: Option<usize>,
    },

    /// Show build order and stale files without compiling
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self, output: &OutputConfig) -> Result<()> {
        let current_dir = std::env::current_dir().context("Failed to read current directory")?;
        let project = Project::load(&current_dir)?;

        match self {
            Self::Build { jobs } => build::execute(&project, jobs, output).map(|_| ()),
            Self::Run { jobs, args } => run::execute(&project, jobs, &args, output),
            Self::Clean { jobs } => clean::execute(&project, jobs, output),
            Self::Check { json } => check::execute(&project, json),
        }
    }
}

fn parse_jobs(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(jobs) => Ok(jobs),
        Err(e) => Err(e.to_string()),
    }
}

/// A located project with its configuration
#[derive(Debug, Clone)]
pub struct Project {
    /// Parsed `kiln.toml`, or defaults
    pub config: ProjectConfig,
    /// Resolved directories
    pub layout: ProjectLayout,
}

impl Project {
    /// Find the project containing `start` and load its configuration
    pub fn load(start: &Path) -> Result<Self> {
        let root = find_root(start).map_err(KilnError::from)?;
        let config = ProjectConfig::load(&root).map_err(KilnError::from)?;
        let layout = ProjectLayout::resolve(&root, &config);
        tracing::info!("Project root: {}", root.display());

        Ok(Self { config, layout })
    }

    /// Worker count: `--jobs`, then `build.jobs`, then the CPU count
    pub fn workers(&self, jobs: Option<usize>) -> usize {
        jobs.or(self.config.build.jobs)
            .unwrap_or_else(default_workers)
    }

    /// Compiler configured for this project
    pub fn toolchain(&self) -> ProcessToolchain {
        ProcessToolchain::new(&self.config.build, &self.layout.include_dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_jobs() {
        assert_eq!(parse_jobs("4"), Ok(4));
        assert!(parse_jobs("0").is_err());
        assert!(parse_jobs("many").is_err());
    }

    #[test]
    fn test_workers_precedence() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("kiln.toml"), "[build]\njobs = 3\n").unwrap();

        let project = Project::load(temp.path()).unwrap();
        assert_eq!(project.workers(Some(7)), 7);
        assert_eq!(project.workers(None), 3);
    }
}
