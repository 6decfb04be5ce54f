//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Absolute path of `name` inside the project
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.join(name).exists()
    }

    /// Set a file's modification time to `seconds_ago` seconds in the past
    pub fn set_age(&self, name: &str, seconds_ago: u64) {
        set_mtime(&self.join(name), SystemTime::now() - Duration::from_secs(seconds_ago));
    }

    /// Modification time of a project file
    pub fn mtime(&self, name: &str) -> SystemTime {
        std::fs::metadata(self.join(name))
            .and_then(|m| m.modified())
            .expect("Failed to read modification time")
    }

    /// `src/main.cpp` including `include/util.h`, implemented in `src/util.cpp`
    pub fn with_sample_sources(self) -> Self {
        self.create_file("src/main.cpp", SAMPLE_MAIN);
        self.create_file("src/util.cpp", SAMPLE_UTIL_SOURCE);
        self.create_file("include/util.h", SAMPLE_UTIL_HEADER);
        self
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Set the modification time of `path`
pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file")
        .set_modified(time)
        .expect("Failed to set modification time");
}

/// Run the kiln binary in `dir`
pub fn run_kiln(dir: &Path, args: &[&str], envs: &[(&str, &Path)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kiln"));
    cmd.current_dir(dir).args(args).env_remove("RUST_LOG");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute kiln")
}

/// Write an executable shell script standing in for a compiler driver
///
/// With `-c` it copies the source into the `-o` target; otherwise it writes
/// a small executable script to the `-o` target. Every invocation is
/// appended to `<dir>/compiler.log`. A source containing `#error` fails to
/// compile.
#[cfg(unix)]
pub fn write_fake_compiler(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-cxx");
    let log = dir.join("compiler.log");
    let script = format!(
        r#"#!/bin/sh
echo "$@" >> "{log}"
out=""
src=""
compile=0
while [ $# -gt 0 ]; do
  case "$1" in
    -o) shift; out="$1" ;;
    -c) compile=1 ;;
    *.o) ;;
    -*) ;;
    *) src="$1" ;;
  esac
  shift
done
if [ "$compile" = 1 ]; then
  if grep -q '#error' "$src"; then
    echo "$src: error: forced failure" >&2
    exit 1
  fi
  cp "$src" "$out"
else
  printf '#!/bin/sh\necho linked\n' > "$out"
  chmod +x "$out"
fi
"#,
        log = log.display()
    );
    std::fs::write(&path, script).expect("Failed to write fake compiler");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake compiler executable");
    path
}

/// Lines the fake compiler logged, one per invocation
pub fn compiler_log(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("compiler.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Sample entry point including a local header
pub const SAMPLE_MAIN: &str = r#"#include <cstdio>
#include "util.h"

int main() {
    std::printf("%d\n", answer());
}
"#;

/// Sample implementation file
pub const SAMPLE_UTIL_SOURCE: &str = r#"#include "util.h"

int answer() { return 42; }
"#;

/// Sample header
pub const SAMPLE_UTIL_HEADER: &str = "#pragma once\n\nint answer();\n";
