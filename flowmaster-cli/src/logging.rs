//! Logging setup for the CLI

use tracing_subscriber::EnvFilter;

/// Initialize tracing based on the verbosity flags
///
/// Logs go to stderr so the execution log on stdout stays clean. An explicit
/// `RUST_LOG` overrides the flags.
pub fn init(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
