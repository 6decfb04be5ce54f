//! Project configuration
//!
//! Reads the optional `kiln.toml` at the project root. Every key has a
//! default, so a project without the file builds with `g++ -std=c++20`.
//!
//! ```toml
//! [build]
//! compiler = "clang++"
//! standard = "c++17"
//! include_dirs = ["include", "third_party/include"]
//! flags = ["-Wall", "-O2"]
//! link_flags = ["-lpthread"]
//! executable = "server"
//! jobs = 8
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults::{
    COMPILER_ENV, CONFIG_FILE, DEFAULT_COMPILER, DEFAULT_EXECUTABLE, DEFAULT_STANDARD,
};
use crate::error::ConfigError;

/// Contents of `kiln.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

/// The `[build]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BuildConfig {
    /// Compiler driver, used for both compiling and linking
    pub compiler: String,

    /// Language standard passed as `-std=<standard>`
    pub standard: String,

    /// Source directories relative to the root (empty: `src`)
    pub source_dirs: Vec<PathBuf>,

    /// Include directories relative to the root (empty: `include`)
    pub include_dirs: Vec<PathBuf>,

    /// Output directory relative to the root (unset: existing `out` or
    /// `build`, else `build`)
    pub build_dir: Option<PathBuf>,

    /// Executable name, placed in the output directory
    pub executable: String,

    /// Extra compile flags
    pub flags: Vec<String>,

    /// Extra link flags
    pub link_flags: Vec<String>,

    /// Parallel compile jobs (unset: logical CPU count)
    pub jobs: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: DEFAULT_COMPILER.to_string(),
            standard: DEFAULT_STANDARD.to_string(),
            source_dirs: Vec::new(),
            include_dirs: Vec::new(),
            build_dir: None,
            executable: DEFAULT_EXECUTABLE.to_string(),
            flags: Vec::new(),
            link_flags: Vec::new(),
            jobs: None,
        }
    }
}

impl ProjectConfig {
    /// Load `kiln.toml` from the project root
    ///
    /// A missing file yields the defaults. `KILN_COMPILER`, when set and
    /// non-empty, replaces the configured compiler.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_path(&root.join(CONFIG_FILE))?;
        config.override_compiler(std::env::var(COMPILER_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file without applying environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from(CONFIG_FILE),
            error: e.to_string(),
        })
    }

    /// Replace the compiler when `value` is a non-empty string
    pub fn override_compiler(&mut self, value: Option<String>) {
        if let Some(compiler) = value.filter(|c| !c.trim().is_empty()) {
            tracing::debug!("Using compiler '{compiler}' from {COMPILER_ENV}");
            self.build.compiler = compiler;
        }
    }

    /// Reject values that cannot produce a working build
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.compiler.trim().is_empty() {
            return Err(invalid("build.compiler", "must not be empty"));
        }
        if self.build.standard.trim().is_empty() {
            return Err(invalid("build.standard", "must not be empty"));
        }
        if self.build.executable.trim().is_empty() {
            return Err(invalid("build.executable", "must not be empty"));
        }
        if self.build.jobs == Some(0) {
            return Err(invalid("build.jobs", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}
