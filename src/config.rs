//! # Scanner Configuration
//!
//! The working-directory scanner's ignore rules and binary heuristics,
//! pulled out of hard-coded constants into a struct so tests can drive
//! them deterministically.

use std::collections::HashSet;

/// Extensions the Scanner always treats as binary regardless of content.
fn default_binary_extensions() -> HashSet<String> {
    [
        // images
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff",
        // archives
        "zip", "gz", "tar", "rar", "7z", "bz2", "xz",
        // audio/video
        "mp3", "mp4", "wav", "ogg", "mov", "avi", "mkv", "flac",
        // fonts and documents
        "woff", "woff2", "ttf", "otf", "pdf",
        // compiled/binary formats
        "so", "dll", "dylib", "exe", "bin", "class", "wasm", "o", "a",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Configuration for the working-directory Scanner and the patch
/// heuristic in the Differ.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Additional ignore patterns beyond the structural defaults
    /// (`*.sit`, `node_modules`, `.git`, `.DS_Store`, which are always
    /// ignored and cannot be disabled here).
    pub extra_ignores: HashSet<String>,
    /// Lowercase file extensions (without the leading dot) always
    /// classified as binary.
    pub binary_extensions: HashSet<String>,
    /// Number of leading bytes probed for a NUL byte when an extension
    /// doesn't already settle the classification.
    pub binary_probe_bytes: usize,
    /// A text file's change is emitted as a `patch` rather than a full
    /// `write` when the changed-character fraction is strictly below
    /// this ratio.
    pub patch_threshold_ratio: f64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extra_ignores: HashSet::new(),
            binary_extensions: default_binary_extensions(),
            binary_probe_bytes: 8_000,
            patch_threshold_ratio: 0.5,
        }
    }
}

impl ScannerConfig {
    /// Names that are always ignored, irrespective of configuration.
    pub fn is_structurally_ignored(name: &str, is_dir: bool) -> bool {
        if is_dir {
            matches!(name, "node_modules" | ".git")
        } else {
            name.ends_with(".sit") || name == ".DS_Store"
        }
    }

    /// Whether `name` (a file or directory's own name, not a full path)
    /// is ignored by this configuration.
    pub fn is_ignored(&self, name: &str, is_dir: bool) -> bool {
        Self::is_structurally_ignored(name, is_dir) || self.extra_ignores.contains(name)
    }
}
