//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorKind;
use crate::error::ConfigError;

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of images described concurrently during `generate`
    pub parallel_workers: usize,

    /// Supported input extensions (content is sniffed as well)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

/// Pipeline settings for backpressure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max finished descriptors buffered before the collector
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { buffer_size: 64 }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 20000,
            decode_timeout_ms: 10000,
        }
    }
}

/// Matching defaults used when the command line does not say otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Number of matches to report, -1 for all
    pub default_matches: i64,

    /// Descriptor kind to match with when a dataset holds several stores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_kind: Option<i64>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            default_matches: 10,
            default_kind: None,
        }
    }
}

impl MatchingConfig {
    /// The configured default kind, if any. An unsupported value is an error.
    pub fn kind(&self) -> Result<Option<DescriptorKind>, ConfigError> {
        self.default_kind
            .map(|k| {
                DescriptorKind::try_from(k).map_err(|_| {
                    ConfigError::ValidationError(format!(
                        "matching.default_kind must be 32, 64, 128 or 256, got {k}"
                    ))
                })
            })
            .transpose()
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
