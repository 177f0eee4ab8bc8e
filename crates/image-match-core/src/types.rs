//! Core data types shared by the generate and match paths.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::descriptor::Descriptor;

/// A descriptor paired with the image it was computed from.
///
/// The identifier is a normalized absolute path and doubles as the
/// deduplication key during incremental generation.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorRecord {
    pub identifier: String,
    pub descriptor: Descriptor,
}

impl DescriptorRecord {
    pub fn new(identifier: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            identifier: identifier.into(),
            descriptor,
        }
    }
}

/// One ranked match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// L1 distance to the query descriptor
    pub distance: f32,

    /// Identifier of the stored image
    #[serde(rename = "path")]
    pub identifier: String,
}

/// Summary of one `generate` run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    /// Store file that was written
    pub store_path: PathBuf,

    /// Descriptors computed in this run
    pub generated: usize,

    /// Images skipped because the store already had them
    pub skipped: usize,

    /// Images that failed to decode
    pub failed: usize,

    /// Records in the store after the run
    pub total: usize,
}
