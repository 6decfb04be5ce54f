//! kiln CLI - Incremental build orchestrator for C and C++ projects
//!
//! Entry point for the kiln command-line application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kiln::cli::output::display_error;
use kiln::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.output_config().log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Run the command and handle errors
    match cli.run() {
        Ok(()) => Ok(()),
        Err(e) => {
            let code = display_error(&e);
            std::process::exit(code);
        }
    }
}
