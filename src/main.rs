use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use runlog::cli::{self, Cli, USAGE, UsageError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILTER_VAR: &str = "RUNLOG_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(usage) = err.downcast_ref::<UsageError>() {
                eprintln!("{}", usage);
                if !matches!(usage, UsageError::MissingId) {
                    eprintln!();
                    eprint!("{}", USAGE);
                }
            } else {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so the selector and command output on stdout stay clean
fn setup_logging(verbose: bool) {
    let default_filter = if verbose { "runlog=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}
