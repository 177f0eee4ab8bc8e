//! RGB to HMMD color transform.
//!
//! The HMMD space is built from Hue, Max, Min and Diff:
//!
//! ```text
//! Max  = max(R, G, B)
//! Min  = min(R, G, B)
//! Diff = Max - Min
//! Sum  = (Max + Min) / 2
//! Hue  = HSV hue, scaled to a byte
//! ```
//!
//! Only Hue, Sum and Diff are kept since those are the axes the quantizer
//! partitions.

use image::RgbImage;

/// One HMMD pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hmmd {
    pub hue: u8,
    pub sum: u8,
    pub diff: u8,
}

impl Hmmd {
    /// Convert one RGB triple.
    ///
    /// Hue arithmetic runs on signed integers and is then truncated to a
    /// byte, so negative intermediate hues wrap around (e.g. -43 -> 213).
    pub fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let diff = max - min;
        let sum = ((max as u16 + min as u16) >> 1) as u8;

        let hue = if diff == 0 {
            0
        } else {
            let (r, g, b, d) = (r as i32, g as i32, b as i32, diff as i32);
            let h = if max as i32 == r {
                43 * (g - b) / d
            } else if max as i32 == g {
                85 + 43 * (b - r) / d
            } else {
                171 + 43 * (r - g) / d
            };
            h as u8
        };

        Self { hue, sum, diff }
    }
}

/// An image whose pixels are stored as HMMD triples.
///
/// Kept distinct from `RgbImage` so a buffer's color space is always
/// visible in its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmmdImage {
    width: u32,
    height: u32,
    pixels: Vec<Hmmd>,
}

impl HmmdImage {
    /// Convert a whole RGB image.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image.pixels().map(|p| Hmmd::from_rgb(p.0)).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> &[Hmmd] {
        &self.pixels
    }
}
