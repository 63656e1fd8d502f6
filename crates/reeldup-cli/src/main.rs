use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod cli;
mod cmd;
mod error;
mod format;
mod io;

pub use cli::{Cli, OutputFormat, PathOrStdin, PathOrStdout};

/// Installs the stderr log subscriber.
///
/// `--verbose` / `--quiet` win over `RUST_LOG`; without either flag
/// `RUST_LOG` is honoured, falling back to info-level logs for this tool.
fn init_tracing(cli: &Cli) {
    let filter = if cli.verbosity_overridden() {
        EnvFilter::new(cli.log_directive())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directive()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = cmd::find::run(&cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}
