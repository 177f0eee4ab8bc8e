//! MPEG-7 Color Structure Descriptor extraction and comparison.
//!
//! Extraction runs five stages, each a pure function of its input:
//!
//! ```text
//! RgbImage → resample → HMMD → quantize → 8x8 structural scan → normalize
//! ```
//!
//! The resulting vector holds, per quantized color, the fraction of 8x8
//! neighborhoods in which that color occurs.

pub mod hmmd;
pub mod kind;
pub mod quantize;
pub mod resample;
pub mod scan;

pub use hmmd::{Hmmd, HmmdImage};
pub use kind::DescriptorKind;
pub use quantize::{QuantizationTable, QuantizedMap, Quantizer};
pub use scan::{RawHistogram, StructuralScanner};

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;
use crate::math::l1_distance;

/// Side length of the square structuring element.
pub const STRUCTURING_ELEMENT_SIZE: usize = 8;

/// A Color Structure Descriptor.
///
/// The value vector always has exactly `kind.bins()` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct Descriptor {
    kind: DescriptorKind,
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct RawDescriptor {
    kind: DescriptorKind,
    values: Vec<f32>,
}

impl TryFrom<RawDescriptor> for Descriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        Descriptor::new(raw.kind, raw.values)
    }
}

impl Descriptor {
    /// Wrap a value vector, checking its length against `kind`.
    pub fn new(kind: DescriptorKind, values: Vec<f32>) -> Result<Self, DescriptorError> {
        if values.len() != kind.bins() {
            return Err(DescriptorError::LengthMismatch {
                kind: kind.as_u16(),
                len: values.len(),
            });
        }
        Ok(Self { kind, values })
    }

    /// Extract the descriptor of an RGB image.
    pub fn extract(image: &RgbImage, kind: DescriptorKind) -> Self {
        tracing::debug!("Generating Color Structure Descriptor type={}", kind);

        let resampled = resample::resample(image);
        tracing::trace!(
            "Resized width: {}, height: {}",
            resampled.width(),
            resampled.height()
        );

        let hmmd = HmmdImage::from_rgb(&resampled);
        let map = Quantizer::new(kind).quantize(&hmmd);
        let histogram = StructuralScanner::new(kind).scan(&map);
        let values = scan::normalize(&histogram);

        Self { kind, values }
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// L1 distance to another descriptor of the same kind.
    ///
    /// Lower means more similar; zero only for identical descriptors.
    pub fn distance(&self, other: &Descriptor) -> Result<f32, DescriptorError> {
        if self.kind != other.kind {
            return Err(DescriptorError::KindMismatch {
                left: self.kind.as_u16(),
                right: other.kind.as_u16(),
            });
        }
        Ok(l1_distance(&self.values, &other.values))
    }
}
