//! image-match core - Color Structure Descriptor extraction and matching.
//!
//! Computes MPEG-7 Color Structure Descriptors for every image in a dataset
//! directory, persists them next to the images, and ranks the stored images
//! by similarity to a query image.
//!
//! # Architecture
//!
//! ```text
//! generate: discover → decode → resample → HMMD → quantize → scan → normalize → csd_<kind>.json
//! match:    query → descriptor ─┐
//!           csd_<kind>.json ────┴→ L1 distance → top-K
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use image_match_core::{Config, DescriptorKind, GenerateOptions, ImageMatch, MatchOptions};
//!
//! #[tokio::main]
//! async fn main() -> image_match_core::Result<()> {
//!     let engine = ImageMatch::new(Config::load()?);
//!
//!     engine
//!         .generate("./photos".as_ref(), DescriptorKind::Bin64, GenerateOptions::default())
//!         .await?;
//!
//!     let matches = engine
//!         .find_matches("./query.jpg".as_ref(), "./photos".as_ref(), MatchOptions::default())
//!         .await?;
//!     for m in matches {
//!         println!("{}\t{}", m.distance, m.identifier);
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod descriptor;
pub mod error;
pub mod math;
pub mod matching;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use descriptor::{Descriptor, DescriptorKind};
pub use error::{
    ConfigError, DescriptorError, MatchError, PipelineError, PipelineResult, Result, StoreError,
};
pub use matching::{MatchLimit, TopKSelector};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{BatchEvent, ImageProcessor};
pub use store::DescriptorStore;
pub use types::{DescriptorRecord, GenerateReport, MatchResult};

use std::path::Path;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for [`ImageMatch::generate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Discard the existing store and describe every image again
    pub force_regenerate: bool,
}

/// Options for [`ImageMatch::find_matches`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// How many matches to return
    pub limit: MatchLimit,

    /// Store kind to match against; falls back to `matching.default_kind`,
    /// then to the only store present in the dataset
    pub kind: Option<DescriptorKind>,
}

/// Progress of a `generate` run.
#[derive(Debug)]
pub enum GenerateProgress<'a> {
    /// Emitted once after discovery
    Planned { pending: usize, skipped: usize },
    /// Emitted once per image that was processed
    Item(BatchEvent<'a>),
}

/// Main entry point: descriptor generation and matching over datasets.
pub struct ImageMatch {
    config: Config,
    processor: ImageProcessor,
}

impl ImageMatch {
    /// Create an engine with the given configuration.
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing image-match v{}", VERSION);
        let processor = ImageProcessor::new(&config);
        Self { config, processor }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compute the descriptor of one image.
    pub async fn describe(&self, image: &Path, kind: DescriptorKind) -> Result<DescriptorRecord> {
        Ok(self.processor.describe(image, kind).await?)
    }

    /// Build or update the `kind` store of `dataset`.
    pub async fn generate(
        &self,
        dataset: &Path,
        kind: DescriptorKind,
        options: GenerateOptions,
    ) -> Result<GenerateReport> {
        self.generate_with_progress(dataset, kind, options, |_| {})
            .await
    }

    /// Like [`generate`](Self::generate), reporting progress to `on_progress`.
    ///
    /// Images already present in the store are skipped unless
    /// `force_regenerate` is set. Images that fail to decode are logged and
    /// counted; the store is written once at the end.
    pub async fn generate_with_progress<F>(
        &self,
        dataset: &Path,
        kind: DescriptorKind,
        options: GenerateOptions,
        mut on_progress: F,
    ) -> Result<GenerateReport>
    where
        F: FnMut(GenerateProgress<'_>),
    {
        if !dataset.is_dir() {
            return Err(PipelineError::FileNotFound(dataset.to_path_buf()).into());
        }
        let dataset = pipeline::normalize_path(dataset);

        let mut store = if options.force_regenerate {
            tracing::info!("Force regenerate: ignoring existing database");
            DescriptorStore::empty(&dataset, kind)
        } else {
            DescriptorStore::open(&dataset, kind)?
        };

        let files = self.processor.discover(&dataset);
        let total_found = files.len();
        let pending: Vec<_> = files
            .into_iter()
            .filter(|f| !store.contains_identifier(&f.identifier()))
            .collect();
        let skipped = total_found - pending.len();

        tracing::info!(
            "Found {} images ({} already in database)",
            total_found,
            skipped
        );
        on_progress(GenerateProgress::Planned {
            pending: pending.len(),
            skipped,
        });

        let outcome = self
            .processor
            .describe_batch(pending, kind, |event| {
                on_progress(GenerateProgress::Item(event))
            })
            .await;

        let failed = outcome.failures.len();
        let generated = store.append(outcome.records)?;
        store.persist()?;

        Ok(GenerateReport {
            store_path: store.path().to_path_buf(),
            generated,
            skipped,
            failed,
            total: store.len(),
        })
    }

    /// Rank the images of `dataset` by similarity to `image`, best first.
    ///
    /// A limit of zero returns immediately without reading anything. The
    /// query image must decode; the store must exist and be well formed.
    pub async fn find_matches(
        &self,
        image: &Path,
        dataset: &Path,
        options: MatchOptions,
    ) -> Result<Vec<MatchResult>> {
        let selector = TopKSelector::new(options.limit);
        if options.limit == MatchLimit::Count(0) {
            tracing::debug!("Zero matches requested");
            return Ok(Vec::new());
        }

        let kind = match options.kind {
            Some(kind) => Some(kind),
            None => self.config.matching.kind()?,
        };
        let (store_path, kind) = DescriptorStore::locate(dataset, kind)?;
        let store = DescriptorStore::load(&store_path, kind)?;

        let query = self.processor.describe(image, kind).await?;
        tracing::info!(
            "Comparing {} against {} stored descriptors",
            query.identifier,
            store.len()
        );

        selector
            .select(&query.descriptor, store.records())
            .map_err(|e| {
                StoreError::Malformed {
                    path: store_path.clone(),
                    message: e.to_string(),
                }
                .into()
            })
    }
}
