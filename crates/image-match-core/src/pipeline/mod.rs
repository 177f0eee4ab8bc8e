//! Image ingestion pipeline.
//!
//! - **discovery**: Find image files in dataset directories
//! - **validate**: Size and signature checks before decoding
//! - **decode**: Load PNG, JPEG and BMP sources as 8-bit RGB
//! - **processor**: Describe single images or whole batches
//! - **channel**: Bounded channels for backpressure

pub mod channel;
pub mod decode;
pub mod discovery;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{normalize_path, DiscoveredFile, FileDiscovery};
pub use processor::{BatchEvent, BatchOutcome, ImageProcessor};
pub use validate::Validator;
