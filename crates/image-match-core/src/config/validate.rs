//! Configuration validation with range checks.

use crate::descriptor::DescriptorKind;
use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.matching.default_matches < -1 {
            return Err(ConfigError::ValidationError(
                "matching.default_matches must be >= 0 or -1 for all".into(),
            ));
        }
        if let Some(kind) = self.matching.default_kind {
            if DescriptorKind::try_from(kind).is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "matching.default_kind must be 32, 64, 128 or 256, got {kind}"
                )));
            }
        }
        Ok(())
    }
}
