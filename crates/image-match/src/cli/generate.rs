//! The `image-match generate` command: build or update a descriptor database.

use clap::Args;
use image_match_core::{
    BatchEvent, Config, DescriptorKind, GenerateOptions, GenerateProgress, GenerateReport,
    ImageMatch,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Descriptor type (number of bins): 32, 64, 128 or 256
    pub kind: DescriptorKind,

    /// Dataset directory to describe
    pub dataset: PathBuf,

    /// Discard the existing database and describe every image again
    #[arg(short, long)]
    pub force_regenerate: bool,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: Config, show_progress: bool) -> anyhow::Result<()> {
    if !args.dataset.is_dir() {
        anyhow::bail!("Dataset directory not found: {}", args.dataset.display());
    }

    let engine = ImageMatch::new(config);
    let options = GenerateOptions {
        force_regenerate: args.force_regenerate,
    };

    let progress = if show_progress {
        create_progress_bar()
    } else {
        ProgressBar::hidden()
    };
    let start_time = Instant::now();

    let report = engine
        .generate_with_progress(&args.dataset, args.kind, options, |event| match event {
            GenerateProgress::Planned { pending, .. } => {
                progress.set_length(pending as u64);
                progress.set_message("describing...");
            }
            GenerateProgress::Item(BatchEvent::Described(_)) => progress.inc(1),
            GenerateProgress::Item(BatchEvent::Failed(path, _)) => {
                progress.inc(1);
                progress.set_message(format!("skipped {}", path.display()));
            }
        })
        .await?;

    progress.finish_and_clear();

    if show_progress {
        print_summary(&report, start_time.elapsed());
    }
    Ok(())
}

/// Create a progress bar for batch generation.
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("discovering...");
    pb
}

/// Print a formatted summary table after generation.
fn print_summary(report: &GenerateReport, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("{}", summary_lines(report, elapsed));
    eprintln!("  ====================================");
}

fn summary_lines(report: &GenerateReport, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        report.generated as f64 / secs
    } else {
        0.0
    };

    let mut lines = vec![format!("    Generated:    {:>8}", report.generated)];
    if report.skipped > 0 {
        lines.push(format!("    Skipped:      {:>8}", report.skipped));
    }
    if report.failed > 0 {
        lines.push(format!("    Failed:       {:>8}", report.failed));
    }
    lines.push("  ------------------------------------".to_string());
    lines.push(format!("    In database:  {:>8}", report.total));
    lines.push(format!("    Duration:     {:>7.1}s", secs));
    lines.push(format!("    Rate:         {:>7.1} img/sec", rate));
    lines.push(format!("    Database:     {}", report.store_path.display()));
    lines.join("\n")
}
