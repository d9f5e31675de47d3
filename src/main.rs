use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use evcplus::cli::{Cli, SessionOutcome};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.run()? {
        SessionOutcome::Locked => Ok(ExitCode::from(2)),
        SessionOutcome::Exited | SessionOutcome::InputClosed => Ok(ExitCode::SUCCESS),
    }
}

/// Log to stderr so diagnostics never mix with the menus on stdout.
/// `RUST_LOG` takes precedence over the verbose flag.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "evcplus=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
