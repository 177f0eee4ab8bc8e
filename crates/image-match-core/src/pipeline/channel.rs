//! Bounded channel between descriptor workers and the single collector.

use tokio::sync::mpsc;

use crate::config::PipelineConfig;

/// Create a bounded channel pair with the configured buffer size.
///
/// When the buffer is full, workers wait before handing over their result,
/// so finished descriptors never pile up faster than the collector drains
/// them.
pub fn bounded_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size.max(1))
}
