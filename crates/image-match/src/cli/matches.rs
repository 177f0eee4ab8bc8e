//! The `image-match match` command: rank dataset images against a query.

use clap::{Args, ValueEnum};
use image_match_core::output::OutputFormat as CoreOutputFormat;
use image_match_core::{
    Config, DescriptorKind, ImageMatch, MatchLimit, MatchOptions, MatchResult, OutputWriter,
};
use std::io::BufWriter;
use std::path::PathBuf;

/// Arguments for the `match` command.
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Query image
    pub image: PathBuf,

    /// Dataset directory holding a descriptor database
    pub dataset: PathBuf,

    /// Number of matches to show, -1 for all (defaults to `matching.default_matches`)
    #[arg(short = 'n', long, allow_hyphen_values = true)]
    pub number_of_matches: Option<MatchLimit>,

    /// Descriptor type to match with; required when the dataset has several databases
    #[arg(short = 't', long = "type")]
    pub kind: Option<DescriptorKind>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// `<distance>\t<path>` per line
    Text,
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => CoreOutputFormat::Text,
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Execute the match command.
pub async fn execute(args: MatchArgs, config: Config) -> anyhow::Result<()> {
    let limit = match args.number_of_matches {
        Some(limit) => limit,
        None => MatchLimit::try_from(config.matching.default_matches)?,
    };

    if limit != MatchLimit::Count(0) && !args.image.is_file() {
        anyhow::bail!("Query image not found: {}", args.image.display());
    }

    let engine = ImageMatch::new(config);
    let options = MatchOptions {
        limit,
        kind: args.kind,
    };
    let results = engine
        .find_matches(&args.image, &args.dataset, options)
        .await?;

    let stdout = std::io::stdout();
    let written = write_results(BufWriter::new(stdout.lock()), args.format, &results)?;
    tracing::debug!("Wrote {} matches", written);
    Ok(())
}

/// Write `results` in the requested format, returning how many were written.
fn write_results<W: std::io::Write>(
    out: W,
    format: OutputFormat,
    results: &[MatchResult],
) -> std::io::Result<usize> {
    let mut writer = OutputWriter::new(out, format.into(), true);
    writer.write_all(results)?;
    writer.flush()?;
    Ok(writer.items_written())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_match_core::GenerateOptions;

    #[test]
    fn test_format_mapping() {
        assert_eq!(
            CoreOutputFormat::from(OutputFormat::Jsonl),
            CoreOutputFormat::JsonLines
        );
        assert_eq!(CoreOutputFormat::from(OutputFormat::Text), CoreOutputFormat::Text);
    }

    #[test]
    fn test_write_results_counts_items() {
        let results = vec![
            MatchResult {
                distance: 0.0,
                identifier: "/d/a.png".to_string(),
            },
            MatchResult {
                distance: 0.5,
                identifier: "/d/b.png".to_string(),
            },
        ];

        let mut buffer = Vec::new();
        let written = write_results(&mut buffer, OutputFormat::Text, &results).unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "0\t/d/a.png\n0.5\t/d/b.png\n"
        );

        let mut buffer = Vec::new();
        let written = write_results(&mut buffer, OutputFormat::Json, &[]).unwrap();
        assert_eq!(written, 0);
        assert_eq!(String::from_utf8(buffer).unwrap(), "[]\n");
    }

    #[tokio::test]
    async fn test_execute_without_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let query = dir.path().join("q.png");
        image::RgbImage::from_pixel(8, 8, image::Rgb([1, 1, 1]))
            .save(&query)
            .unwrap();

        let args = MatchArgs {
            image: query,
            dataset: dir.path().to_path_buf(),
            number_of_matches: None,
            kind: None,
            format: OutputFormat::Text,
        };
        let err = execute(args, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("generate"));
    }

    #[tokio::test]
    async fn test_execute_after_generate() {
        let dir = tempfile::tempdir().unwrap();
        let query = dir.path().join("q.png");
        image::RgbImage::from_pixel(8, 8, image::Rgb([200, 1, 1]))
            .save(&query)
            .unwrap();
        ImageMatch::new(Config::default())
            .generate(dir.path(), DescriptorKind::Bin64, GenerateOptions::default())
            .await
            .unwrap();

        let args = MatchArgs {
            image: query,
            dataset: dir.path().to_path_buf(),
            number_of_matches: Some(MatchLimit::All),
            kind: None,
            format: OutputFormat::Json,
        };
        execute(args, Config::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_matches_skips_everything() {
        let args = MatchArgs {
            image: PathBuf::from("/missing.png"),
            dataset: PathBuf::from("/missing"),
            number_of_matches: Some(MatchLimit::Count(0)),
            kind: None,
            format: OutputFormat::Text,
        };
        execute(args, Config::default()).await.unwrap();
    }
}
