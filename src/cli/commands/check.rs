//! Check command implementation
//!
//! Implements `kiln check` to show what a build would do without compiling.

use anyhow::{Context, Result};

use super::Project;
use crate::cli::output::status;
use crate::core::check::{check_project, CheckReport};
use crate::core::graph::UnresolvedReason;
use crate::core::plan::display_relative;

/// Execute the check command
pub fn execute(project: &Project, json: bool) -> Result<()> {
    let report = check_project(project.layout.clone(), &project.toolchain())?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to serialize check report")?;
        println!("{rendered}");
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &CheckReport) {
    let rel = |path: &std::path::Path| display_relative(&report.root, path);

    println!("Checking project at {}\n", report.root.display());

    if report.compiler_available {
        println!("{} Compiler '{}' is available", status::SUCCESS, report.compiler);
    } else {
        println!("{} Compiler '{}' not found in PATH", status::WARNING, report.compiler);
    }

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("  {} {warning}", status::WARNING);
        }
    }

    if !report.unresolved.is_empty() {
        println!("\nUnresolved includes:");
        for include in &report.unresolved {
            let reason = match &include.reason {
                UnresolvedReason::Missing => "no matching header".to_string(),
                UnresolvedReason::Ambiguous { candidates } => {
                    format!("{} matching headers", candidates.len())
                }
            };
            println!("  • \"{}\" in {} ({reason})", include.name, rel(&include.from));
        }
    }

    println!("\nBuild order:");
    if report.build_order.is_empty() {
        println!("  (none)");
    }
    for path in &report.build_order {
        println!("  • {}", rel(path));
    }

    println!("\nFiles that would be compiled:");
    if report.stale.is_empty() {
        println!("  (none)");
    }
    for unit in &report.stale {
        println!("  • {} ({})", rel(&unit.source), unit.reason);
    }

    println!();
    if report.up_to_date {
        println!("{} {} is up to date", status::SUCCESS, rel(&report.executable));
    } else {
        println!(
            "{} {} of {} units need compiling",
            status::SUCCESS,
            report.stale.len(),
            report.units
        );
    }
}
