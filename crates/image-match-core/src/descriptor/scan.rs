//! Structuring-element scan and histogram normalization.

use super::kind::DescriptorKind;
use super::quantize::QuantizedMap;
use super::STRUCTURING_ELEMENT_SIZE;

/// Per-bin window counts produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHistogram {
    /// For each bin, the number of window positions containing it
    pub counts: Vec<u32>,
    /// Number of window positions scanned
    pub windows: u64,
}

/// Slides the 8x8 structuring element over a quantized map.
#[derive(Debug, Clone)]
pub struct StructuralScanner {
    kind: DescriptorKind,
}

impl StructuralScanner {
    pub fn new(kind: DescriptorKind) -> Self {
        Self { kind }
    }

    /// Number of window positions for a map of the given size.
    ///
    /// Zero when either side is shorter than the structuring element.
    pub fn window_count(width: u32, height: u32) -> u64 {
        let se = STRUCTURING_ELEMENT_SIZE as u64;
        let w = (width as u64 + 1).saturating_sub(se);
        let h = (height as u64 + 1).saturating_sub(se);
        w * h
    }

    /// Count, for every bin, how many window positions contain it at least once.
    pub fn scan(&self, map: &QuantizedMap) -> RawHistogram {
        let bins = self.kind.bins();
        let mut counts = vec![0u32; bins];
        let windows = Self::window_count(map.width(), map.height());
        if windows == 0 {
            return RawHistogram { counts, windows };
        }

        let se = STRUCTURING_ELEMENT_SIZE;
        let width = map.width() as usize;
        let height = map.height() as usize;

        // Marker array is reset once per window via the list of touched bins.
        let mut seen = vec![false; bins];
        let mut touched: Vec<usize> = Vec::with_capacity(se * se);

        for y in 0..=height - se {
            for x in 0..=width - se {
                for row in y..y + se {
                    for &bin in &map.row(row)[x..x + se] {
                        let bin = bin as usize;
                        if !seen[bin] {
                            seen[bin] = true;
                            touched.push(bin);
                        }
                    }
                }

                for bin in touched.drain(..) {
                    counts[bin] += 1;
                    seen[bin] = false;
                }
            }
        }

        RawHistogram { counts, windows }
    }
}

/// Divide window counts by the number of windows.
///
/// Every value lands in `[0, 1]`. An empty scan (no windows) yields zeros.
pub fn normalize(histogram: &RawHistogram) -> Vec<f32> {
    if histogram.windows == 0 {
        return vec![0.0; histogram.counts.len()];
    }
    let windows = histogram.windows as f64;
    histogram
        .counts
        .iter()
        .map(|&count| (count as f64 / windows) as f32)
        .collect()
}
