//! hwid command line tool
//!
//! Generates the hardware fingerprint of this machine and checks previously
//! issued fingerprints against it. Logs go to stderr; stdout carries only
//! results so the tool can be scripted.

mod cli;

use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    let cli_args = cli::Cli::parse();

    init_logging(cli_args.verbose);
    debug!("hwid {} starting", VERSION);

    match cli::run_cli(&cli_args) {
        Ok(cli::Outcome::Accepted) => ExitCode::SUCCESS,
        Ok(cli::Outcome::Rejected) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// RUST_LOG wins when set; otherwise --verbose selects debug, default warn
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter)
        .init();
}
