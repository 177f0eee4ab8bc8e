//! Error types for descriptor generation and matching.
//!
//! Errors are grouped by concern so callers can tell per-image failures
//! (recoverable during batch generation) apart from structural failures
//! (bad kind, bad store) that abort the whole operation.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for image-match operations.
#[derive(Error, Debug)]
pub enum MatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-image pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Descriptor construction or comparison errors
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Descriptor store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while turning one image file into a descriptor.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image bytes could not be read or decoded
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Decoded image is not a 3-channel RGB source
    #[error("Unsupported channel count for {path}: expected 3, found {channels}")]
    UnsupportedChannels { path: PathBuf, channels: u8 },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Decode did not finish in time
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Errors concerning descriptor kinds and descriptor values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// Integer is not one of the supported bin counts
    #[error("{0} is not a valid descriptor kind (expected 32, 64, 128 or 256)")]
    InvalidKind(i64),

    /// Two descriptors with different bin counts were compared
    #[error("Cannot compare a {left}-bin descriptor with a {right}-bin descriptor")]
    KindMismatch { left: u16, right: u16 },

    /// Value vector length does not match the declared kind
    #[error("Descriptor of kind {kind} has {len} values")]
    LengthMismatch { kind: u16, len: usize },
}

/// Errors raised by the persisted descriptor store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store file is structurally invalid
    #[error("Invalid database file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// No store file could be found for the dataset
    #[error(
        "Database file not found in {dir}. Run the `generate` subcommand first."
    )]
    NotFound { dir: PathBuf },

    /// Several store files exist and no kind was specified
    #[error(
        "Multiple database files found in {dir} (kinds: {kinds}). \
         Use --type to choose the descriptor type."
    )]
    Ambiguous { dir: PathBuf, kinds: String },

    /// Store file exists but could not be read
    #[error("Could not read database {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store file could not be written
    #[error("Could not write database {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for image-match results.
pub type Result<T> = std::result::Result<T, MatchError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
