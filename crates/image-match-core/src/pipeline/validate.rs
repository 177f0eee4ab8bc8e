//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Number of leading bytes inspected for a format signature.
const MAGIC_NUMBER_BYTES: usize = 8;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Validates files before decoding.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - File starts with a PNG, JPEG or BMP signature
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if !Self::has_image_signature(path) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    /// Whether the file starts with a supported image signature.
    ///
    /// Unreadable or too-short files are reported as unsupported.
    pub fn has_image_signature(path: &Path) -> bool {
        let mut header = [0u8; MAGIC_NUMBER_BYTES];
        let read = std::fs::File::open(path).and_then(|mut f| f.read_exact(&mut header));
        match read {
            Ok(()) => Self::is_valid_image_header(&header),
            Err(e) => {
                tracing::debug!("Could not read magic number for {:?}: {}", path, e);
                false
            }
        }
    }

    /// Check if the header bytes match PNG, JPEG or BMP.
    fn is_valid_image_header(header: &[u8; MAGIC_NUMBER_BYTES]) -> bool {
        match header[0] {
            0xFF => header[1] == 0xD8 && header[2] == 0xFF,
            0x89 => *header == PNG_SIGNATURE,
            b'B' => header[1] == b'M',
            _ => false,
        }
    }
}
