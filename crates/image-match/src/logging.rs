//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Notes
///
/// - Log output goes to stderr (stdout is reserved for match results)
/// - The RUST_LOG environment variable can override the log level
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the configuration, with command-line overrides.
pub fn init_from_config(
    config: &image_match_core::Config,
    verbose: bool,
    quiet: bool,
    json_logs_override: bool,
) {
    let level = effective_level(&config.logging.level, verbose, quiet);
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}

/// `--quiet` wins over everything, then `--verbose`, then the config file.
fn effective_level(configured: &str, verbose: bool, quiet: bool) -> &str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        configured
    }
}
