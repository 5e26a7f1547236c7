//! Corten BF CLI
//!
//! Entry point. Parses CLI arguments, sets up logging on stderr and
//! delegates to the Runtime for execution.

use bf_cli::{Cli, Runtime, RuntimeConfig};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Log to stderr so program output on stdout stays byte-exact.
///
/// `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = Runtime::new(RuntimeConfig::from(&cli));
    if let Err(e) = runtime.execute_file(&cli.file) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
