//! Pipeline orchestration: turns image files into descriptor records.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::{Config, PipelineConfig};
use crate::descriptor::{Descriptor, DescriptorKind};
use crate::error::{PipelineError, PipelineResult};
use crate::types::DescriptorRecord;

use super::channel::bounded_channel;
use super::decode::ImageDecoder;
use super::discovery::{normalize_path, DiscoveredFile, FileDiscovery};
use super::validate::Validator;

/// Progress notification emitted once per finished image of a batch.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Descriptor computed
    Described(&'a Path),
    /// Image skipped because it could not be read or decoded
    Failed(&'a Path, &'a PipelineError),
}

/// Everything a batch produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful records, sorted by identifier
    pub records: Vec<DescriptorRecord>,
    /// Images that failed, with the reason
    pub failures: Vec<(PathBuf, PipelineError)>,
}

/// Validates, decodes and describes images.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    decoder: ImageDecoder,
    validator: Validator,
    discovery: FileDiscovery,
    pipeline: PipelineConfig,
    parallel_workers: usize,
}

impl ImageProcessor {
    /// Create a new image processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone()),
            pipeline: config.pipeline.clone(),
            parallel_workers: config.processing.parallel_workers.max(1),
        }
    }

    /// Discover all candidate image files under a dataset directory.
    pub fn discover(&self, root: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(root)
    }

    /// Compute the descriptor of a single image file.
    pub async fn describe(
        &self,
        path: &Path,
        kind: DescriptorKind,
    ) -> PipelineResult<DescriptorRecord> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {:?}", path);

        self.validator.validate(path)?;

        let decoded = self.decoder.decode(path).await?;
        tracing::trace!(
            "  Decode: {:?} ({:?}, {}x{})",
            start.elapsed(),
            decoded.format,
            decoded.image.width(),
            decoded.image.height()
        );

        // Extraction is CPU-bound; keep it off the async workers.
        let image = decoded.image;
        let descriptor = tokio::task::spawn_blocking(move || Descriptor::extract(&image, kind))
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            })?;

        let identifier = normalize_path(path).to_string_lossy().into_owned();
        tracing::debug!("Described {} in {:?}", identifier, start.elapsed());

        Ok(DescriptorRecord::new(identifier, descriptor))
    }

    /// Describe many images with bounded concurrency.
    ///
    /// Up to `parallel_workers` images are in flight at once. Finished
    /// results flow through a bounded channel to this task, which is the
    /// only writer of the outcome. Failures are logged and collected; they
    /// never stop the batch.
    pub async fn describe_batch<F>(
        &self,
        files: Vec<DiscoveredFile>,
        kind: DescriptorKind,
        mut on_event: F,
    ) -> BatchOutcome
    where
        F: FnMut(BatchEvent<'_>),
    {
        let (tx, mut rx) = bounded_channel::<(PathBuf, PipelineResult<DescriptorRecord>)>(
            &self.pipeline,
        );
        let semaphore = Arc::new(Semaphore::new(self.parallel_workers));

        let processor = self.clone();
        let producer = tokio::spawn(async move {
            for file in files {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!("Worker semaphore closed unexpectedly, stopping batch");
                        break;
                    }
                };

                let processor = processor.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = processor.describe(&file.path, kind).await;
                    drop(permit);
                    // Receiver only disappears if the collector was dropped.
                    let _ = tx.send((file.path, result)).await;
                });
            }
        });

        let mut outcome = BatchOutcome::default();
        while let Some((path, result)) = rx.recv().await {
            match result {
                Ok(record) => {
                    on_event(BatchEvent::Described(&path));
                    outcome.records.push(record);
                }
                Err(e) => {
                    tracing::warn!("Error reading {}! {}. Skipping.", path.display(), e);
                    on_event(BatchEvent::Failed(&path, &e));
                    outcome.failures.push((path, e));
                }
            }
        }

        if let Err(e) = producer.await {
            tracing::error!("Batch producer task failed: {e}");
        }

        outcome
            .records
            .sort_by(|a, b| a.identifier.cmp(&b.identifier));
        outcome
    }
}
