//! Image decoding with format detection, channel checks, and timeout support.

use image::{ImageFormat, RgbImage};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// 8-bit RGB pixels
    pub image: RgbImage,
    /// Detected image format
    pub format: ImageFormat,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an image file off the async runtime, bounded by the decode timeout.
    pub async fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let decoder = self.clone();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || decoder.decode_sync(&path_owned)),
        )
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode: sniff the format, decode, and check channels and size.
    pub fn decode_sync(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read file: {}", e),
        })?;
        self.decode_bytes(bytes, path)
    }

    /// Decode an in-memory buffer; `path` is only used for error context.
    pub fn decode_bytes(&self, bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, PipelineError> {
        use std::io::Cursor;

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp)) => f,
            Some(other) => {
                return Err(PipelineError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: format!("{:?}", other).to_lowercase(),
                })
            }
            None => {
                return Err(PipelineError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                })
            }
        };

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let channels = image.color().channel_count();
        if channels != 3 {
            return Err(PipelineError::UnsupportedChannels {
                path: path.to_path_buf(),
                channels,
            });
        }

        if image.width() > self.limits.max_image_dimension
            || image.height() > self.limits.max_image_dimension
        {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width: image.width(),
                height: image.height(),
                max_dim: self.limits.max_image_dimension,
            });
        }

        Ok(DecodedImage {
            image: image.into_rgb8(),
            format,
        })
    }
}
