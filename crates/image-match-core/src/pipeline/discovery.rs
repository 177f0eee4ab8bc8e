//! File discovery for finding candidate images in a dataset directory.

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

use super::validate::Validator;

/// Discovers image files in directories.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Normalized absolute path to the file
    pub path: PathBuf,
}

impl DiscoveredFile {
    /// The record identifier for this file.
    pub fn identifier(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files under `root`.
    ///
    /// Walks recursively (following links) and keeps regular files with a
    /// supported extension whose leading bytes carry a known image
    /// signature. Paths are normalized and sorted, so repeated calls over
    /// an unchanged tree yield the same sequence.
    pub fn discover(&self, root: &Path) -> Vec<DiscoveredFile> {
        let root = normalize_path(root);
        tracing::info!("Searching for images in {}", root.display());

        let mut files = Vec::new();

        for entry in WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if !entry_path.is_file() || !self.is_supported(entry_path) {
                continue;
            }
            if !Validator::has_image_signature(entry_path) {
                tracing::debug!("Skipping {:?}: signature does not match", entry_path);
                continue;
            }
            tracing::trace!("Adding file {:?}", entry_path);
            files.push(DiscoveredFile {
                path: normalize_path(entry_path),
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}

/// Make `path` absolute and resolve `.` and `..` lexically.
///
/// Symlinks are not resolved, so the result names the file the way the
/// dataset tree does.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root leaves the root in place.
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
