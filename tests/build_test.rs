//! Integration tests for `kiln build` and `kiln run`
//!
//! These run the real binary against a shell script standing in for the
//! compiler driver.

#![cfg(unix)]

mod common;

use common::{compiler_log, run_kiln, write_fake_compiler, TestProject};
use tempfile::TempDir;

fn sample_project() -> TestProject {
    let project = TestProject::new().with_sample_sources();
    for name in ["src/main.cpp", "src/util.cpp", "include/util.h"] {
        project.set_age(name, 100);
    }
    project
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_build_compiles_and_links() {
    let project = sample_project();
    let tools = TempDir::new().unwrap();
    let compiler = write_fake_compiler(tools.path());

    let output = run_kiln(&project.path(), &["build"], &[("KILN_COMPILER", compiler.as_path())]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.file_exists("build/main.o"));
    assert!(project.file_exists("build/util.o"));
    assert!(project.file_exists("build/main"));

    let out = stdout(&output);
    assert!(out.contains("Compiling src/util.cpp"));
    assert!(out.contains("Compiling src/main.cpp"));
    assert!(out.contains("Linking build/main (2 objects)"));
    assert!(out.contains("Build succeeded"));

    let log = compiler_log(tools.path());
    assert_eq!(log.len(), 3);
    assert!(log.iter().filter(|line| line.contains(" -c ")).count() == 2);
    assert!(log[2].contains("-std=c++20"));
}

#[test]
fn test_second_build_is_up_to_date() {
    let project = sample_project();
    let tools = TempDir::new().unwrap();
    let compiler = write_fake_compiler(tools.path());
    let envs = [("KILN_COMPILER", compiler.as_path())];

    assert!(run_kiln(&project.path(), &["build"], &envs).status.success());
    project.set_age("build/main.o", 50);
    project.set_age("build/util.o", 50);
    project.set_age("build/main", 10);

    let output = run_kiln(&project.path(), &["build"], &envs);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("build/main is up to date"));
    assert_eq!(compiler_log(tools.path()).len(), 3);
}

#[test]
fn test_touched_header_rebuilds_includers() {
    let project = sample_project();
    let tools = TempDir::new().unwrap();
    let compiler = write_fake_compiler(tools.path());
    let envs = [("KILN_COMPILER", compiler.as_path())];

    assert!(run_kiln(&project.path(), &["build"], &envs).status.success());
    project.set_age("build/main.o", 50);
    project.set_age("build/util.o", 50);
    project.set_age("build/main", 40);
    project.set_age("include/util.h", 10);

    let output = run_kiln(&project.path(), &["build"], &envs);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let log = compiler_log(tools.path());
    assert_eq!(log.len(), 6);
    assert!(stdout(&output).contains("Linking build/main"));
}

#[test]
fn test_run_builds_then_executes() {
    let project = sample_project();
    let tools = TempDir::new().unwrap();
    let compiler = write_fake_compiler(tools.path());

    let output = run_kiln(
        &project.path(),
        &["run", "--", "--answer"],
        &[("KILN_COMPILER", compiler.as_path())],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Build succeeded"));
    assert!(out.contains("linked"));
}

#[test]
fn test_compile_error_exits_with_failure() {
    let project = sample_project();
    project.create_file("src/broken.cpp", "#error not today\n");
    let tools = TempDir::new().unwrap();
    let compiler = write_fake_compiler(tools.path());

    let output = run_kiln(&project.path(), &["build"], &[("KILN_COMPILER", compiler.as_path())]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("forced failure"));
    assert!(err.contains("1 of 3 source files failed to compile"));
    assert!(!project.file_exists("build/main"));
    assert!(compiler_log(tools.path())
        .iter()
        .all(|line| line.contains(" -c ")));
}

#[test]
fn test_include_cycle_is_fatal() {
    let project = sample_project();
    project.create_file("include/a.h", "#include \"b.h\"\n");
    project.create_file("include/b.h", "#include \"a.h\"\n");
    let tools = TempDir::new().unwrap();
    let compiler = write_fake_compiler(tools.path());

    let output = run_kiln(&project.path(), &["build"], &[("KILN_COMPILER", compiler.as_path())]);

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Circular include detected"));
    assert!(compiler_log(tools.path()).is_empty());
    assert!(!project.file_exists("build"));
}

#[test]
fn test_missing_project_root_is_fatal() {
    let project = TestProject::new();

    let output = run_kiln(&project.path(), &["build"], &[]);

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("No project root found"));
}

#[test]
fn test_zero_jobs_is_usage_error() {
    let project = sample_project();

    let output = run_kiln(&project.path(), &["build", "--jobs", "0"], &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!project.file_exists("build"));
}

#[test]
fn test_build_from_subdirectory_uses_project_root() {
    let project = sample_project();
    let tools = TempDir::new().unwrap();
    let compiler = write_fake_compiler(tools.path());

    let output = run_kiln(
        &project.join("include"),
        &["build"],
        &[("KILN_COMPILER", compiler.as_path())],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.file_exists("build/main"));
}
