//! Nonuniform HMMD quantization into descriptor bins.
//!
//! The Diff axis is cut into subspaces. Inside each subspace the top
//! `hue_bits` of Hue and the top `sum_bits` of Sum are kept, and the
//! subspaces are laid out one after another in bin space. Bit allocations
//! follow the MPEG-7 Color Structure tables; kind 32 uses four subspaces,
//! the larger kinds use five.

use super::hmmd::{Hmmd, HmmdImage};
use super::kind::DescriptorKind;

/// Maximum number of Diff subspaces in any table.
const MAX_SUBSPACES: usize = 5;

/// Per-kind quantization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizationTable {
    /// Inclusive upper Diff bound of each subspace; the last is always 255.
    pub boundaries: &'static [u8],
    /// Hue bits retained per subspace
    pub hue_bits: &'static [u8],
    /// Sum bits retained per subspace
    pub sum_bits: &'static [u8],
}

const TABLE_32: QuantizationTable = QuantizationTable {
    boundaries: &[5, 59, 109, 255],
    hue_bits: &[0, 2, 2, 2],
    sum_bits: &[3, 2, 0, 0],
};

const TABLE_64: QuantizationTable = QuantizationTable {
    boundaries: &[5, 19, 59, 109, 255],
    hue_bits: &[0, 2, 2, 3, 3],
    sum_bits: &[3, 2, 2, 1, 0],
};

const TABLE_128: QuantizationTable = QuantizationTable {
    boundaries: &[5, 19, 59, 109, 255],
    hue_bits: &[0, 2, 3, 3, 3],
    sum_bits: &[4, 2, 2, 2, 2],
};

const TABLE_256: QuantizationTable = QuantizationTable {
    boundaries: &[5, 19, 59, 109, 255],
    hue_bits: &[0, 2, 4, 4, 4],
    sum_bits: &[5, 3, 2, 2, 2],
};

impl QuantizationTable {
    /// The MPEG-7 table for a descriptor kind.
    pub fn for_kind(kind: DescriptorKind) -> &'static QuantizationTable {
        match kind {
            DescriptorKind::Bin32 => &TABLE_32,
            DescriptorKind::Bin64 => &TABLE_64,
            DescriptorKind::Bin128 => &TABLE_128,
            DescriptorKind::Bin256 => &TABLE_256,
        }
    }

    pub fn subspaces(&self) -> usize {
        self.boundaries.len()
    }

    /// Number of bins a subspace contributes.
    pub fn subspace_bins(&self, subspace: usize) -> usize {
        1 << (self.hue_bits[subspace] + self.sum_bits[subspace])
    }

    /// Smallest subspace whose bound is >= `diff`.
    pub fn subspace_of(&self, diff: u8) -> usize {
        // The last bound is 255, so the scan always terminates inside the table.
        self.boundaries
            .iter()
            .position(|&bound| diff <= bound)
            .unwrap_or(self.boundaries.len() - 1)
    }
}

/// A grid of bin indices, one per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedMap {
    width: u32,
    height: u32,
    bins: Vec<u8>,
}

impl QuantizedMap {
    /// Build a map from raw bin indices. `bins.len()` must be `width * height`.
    pub fn from_bins(width: u32, height: u32, bins: Vec<u8>) -> Option<Self> {
        (bins.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            bins,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bin indices in row-major order.
    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    /// One row of bin indices.
    pub fn row(&self, y: usize) -> &[u8] {
        let w = self.width as usize;
        &self.bins[y * w..(y + 1) * w]
    }
}

/// Maps HMMD pixels to bin indices for one descriptor kind.
#[derive(Debug, Clone)]
pub struct Quantizer {
    kind: DescriptorKind,
    table: &'static QuantizationTable,
    offsets: [u16; MAX_SUBSPACES],
}

impl Quantizer {
    pub fn new(kind: DescriptorKind) -> Self {
        let table = QuantizationTable::for_kind(kind);
        let mut offsets = [0u16; MAX_SUBSPACES];
        let mut acc = 0u16;
        for (s, offset) in offsets.iter_mut().enumerate().take(table.subspaces()) {
            *offset = acc;
            acc += table.subspace_bins(s) as u16;
        }
        debug_assert_eq!(acc as usize, kind.bins());

        Self {
            kind,
            table,
            offsets,
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    /// Bin index of a single HMMD pixel, always below `kind.bins()`.
    pub fn bin(&self, pixel: Hmmd) -> u8 {
        let s = self.table.subspace_of(pixel.diff);
        let hue_bits = self.table.hue_bits[s] as u32;
        let sum_bits = self.table.sum_bits[s] as u32;

        // Shift in u32 so a zero-bit allocation (shift by 8) yields 0.
        let hue = (pixel.hue as u32) >> (8 - hue_bits);
        let sum = (pixel.sum as u32) >> (8 - sum_bits);

        (self.offsets[s] as u32 + (hue << sum_bits) + sum) as u8
    }

    /// Quantize every pixel of an HMMD image.
    pub fn quantize(&self, image: &HmmdImage) -> QuantizedMap {
        let bins = image.pixels().iter().map(|&p| self.bin(p)).collect();
        QuantizedMap {
            width: image.width(),
            height: image.height(),
            bins,
        }
    }
}
