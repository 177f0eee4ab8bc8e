//! Power-of-two downscaling to a bounded working resolution.

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Smallest width/height the resampler will produce.
///
/// Equals the structuring element size so the window scan always has at
/// least one valid position.
pub const MIN_DIMENSION: u32 = super::STRUCTURING_ELEMENT_SIZE as u32;

/// Compute the downscale exponent `p` for an image of the given size.
///
/// `p = max(0, floor(log2(sqrt(width * height)) - 7.5))`
pub fn scale_exponent(width: u32, height: u32) -> u32 {
    let area = width as f64 * height as f64;
    if area < 1.0 {
        return 0;
    }
    let p = (area.sqrt().log2() - 7.5).floor();
    if p > 0.0 {
        p as u32
    } else {
        0
    }
}

/// Target dimensions after shrinking by `2^p`, floored at [`MIN_DIMENSION`].
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    let p = scale_exponent(width, height);
    let shrink = |dim: u32| dim.checked_shr(p).unwrap_or(0).max(MIN_DIMENSION);
    (shrink(width), shrink(height))
}

/// Produce a resampled copy of `image`; the input is never mutated.
///
/// Uses a triangle (bilinear area) filter so fine detail is averaged
/// rather than aliased into spurious color bins.
pub fn resample(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let (target_w, target_h) = target_dimensions(width, height);

    if (target_w, target_h) == (width, height) {
        return image.clone();
    }

    tracing::trace!(
        "Resampling {}x{} -> {}x{}",
        width,
        height,
        target_w,
        target_h
    );
    imageops::resize(image, target_w, target_h, FilterType::Triangle)
}
