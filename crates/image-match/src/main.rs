//! image-match CLI - find visually similar images with Color Structure Descriptors.
//!
//! Descriptors for every image of a dataset directory are computed once and
//! stored next to the images; a query image is then ranked against them.
//!
//! # Usage
//!
//! ```bash
//! # Describe every image under ./photos with 64-bin descriptors
//! image-match generate 64 ./photos
//!
//! # Recompute everything, ignoring the existing database
//! image-match generate 64 ./photos --force-regenerate
//!
//! # Show the 5 closest images
//! image-match match query.jpg ./photos -n 5
//!
//! # View configuration
//! image-match config show
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use image_match_core::{Config, ConfigError};

mod cli;
mod logging;

/// image-match - find visually similar images using MPEG-7 Color Structure Descriptors.
#[derive(Parser, Debug)]
#[command(name = "image-match")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors and hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute descriptors for every image in a dataset directory
    Generate(cli::generate::GenerateArgs),

    /// Rank dataset images by similarity to a query image
    Match(cli::matches::MatchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(Config::load(), &cli.command)?;
    logging::init_from_config(&config, cli.verbose, cli.quiet, cli.json_logs);

    tracing::debug!("image-match v{}", image_match_core::VERSION);

    let result = match cli.command {
        Commands::Generate(args) => cli::generate::execute(args, config, !cli.quiet).await,
        Commands::Match(args) => cli::matches::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    };

    if let Err(e) = &result {
        tracing::error!("{e:#}");
    }
    result
}

/// Pick the configuration a command runs with.
///
/// `generate` and `match` refuse to run on a config that failed to load.
/// The `config` command falls back to defaults so a broken file can still
/// be located and replaced.
fn resolve_config(
    loaded: Result<Config, ConfigError>,
    command: &Commands,
) -> anyhow::Result<Config> {
    match (loaded, command) {
        (Ok(config), _) => Ok(config),
        (Err(e), Commands::Config(_)) => {
            // Logging isn't initialized yet, so use eprintln for config warnings.
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `image-match config path`."
            );
            Ok(Config::default())
        }
        (Err(e), _) => Err(e).context(
            "Failed to load config. Fix it or check its location with `image-match config path`",
        ),
    }
}
