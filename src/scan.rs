//! # Scanner
//!
//! Walks the working directory into a [`TreeState`] snapshot, the same
//! shape the Tree Folder produces from the history file — so the Differ
//! can compare "what the log says" against "what's actually on disk"
//! without caring which side a given `TreeState` came from.
//!
//! Binary classification is a two-stage heuristic: an extension already
//! in [`ScannerConfig::binary_extensions`] settles it immediately;
//! otherwise the first `binary_probe_bytes` bytes are scanned for a NUL
//! byte.

use crate::config::ScannerConfig;
use crate::error::SitError;
use crate::hash::{blob_hash_binary, blob_hash_text};
use crate::tree::{TreeNode, TreeState};
use base64::Engine;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

fn extension_of(name: &str) -> Option<String> {
    Path::new(name).extension().map(|ext| ext.to_string_lossy().to_lowercase())
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

fn is_ignored_entry(entry: &DirEntry, config: &ScannerConfig) -> bool {
    let name = entry.file_name().to_string_lossy();
    config.is_ignored(&name, entry.file_type().is_dir())
}

/// Classify a file's bytes as text or binary and produce its `TreeNode`.
fn classify(relative_path: &str, bytes: &[u8], config: &ScannerConfig) -> Result<TreeNode, SitError> {
    let extension_says_binary = extension_of(relative_path).is_some_and(|ext| config.binary_extensions.contains(&ext));

    let probe_len = bytes.len().min(config.binary_probe_bytes);
    let is_binary = extension_says_binary || looks_binary(&bytes[..probe_len]);

    if is_binary {
        let content_base64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(TreeNode::Binary { hash: blob_hash_binary(bytes), size: bytes.len() as u64, content_base64 })
    } else {
        let content = String::from_utf8(bytes.to_vec()).map_err(|_| SitError::MalformedRecord {
            detail: format!("{relative_path} failed UTF-8 decoding after passing the text heuristic"),
        })?;
        Ok(TreeNode::File { hash: blob_hash_text(&content), content })
    }
}

/// Walk `root` and produce a `TreeState` describing the working
/// directory as it currently stands on disk.
pub fn scan_working_tree(root: &Path, config: &ScannerConfig) -> Result<TreeState, SitError> {
    let mut state = TreeState::new();

    let walker = WalkDir::new(root).min_depth(1).into_iter().filter_entry(|entry| !is_ignored_entry(entry, config));

    for entry in walker {
        let entry = entry.map_err(|err| SitError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .expect("walkdir entries are always rooted under root")
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");

        if entry.file_type().is_dir() {
            state.insert(relative, TreeNode::Directory);
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let bytes = std::fs::read(entry.path())?;
        let node = classify(&relative, &bytes, config)?;
        state.insert(relative, node);
    }

    Ok(state)
}

/// Scan only `paths` (each relative to `root`) into a `TreeState`, rather
/// than the whole working directory — the basis for a path-scoped `add`.
/// A directory path is walked recursively rooted at that directory; a
/// missing path (already deleted on disk) is simply absent from the
/// result, which is what lets a deletion be staged at all.
pub fn scan_paths(root: &Path, paths: &[String], config: &ScannerConfig) -> Result<TreeState, SitError> {
    let mut state = TreeState::new();

    for raw in paths {
        let relative_root = raw.trim_end_matches('/').to_string();
        let full = root.join(&relative_root);

        if full.is_dir() {
            state.insert(relative_root.clone(), TreeNode::Directory);

            let walker = WalkDir::new(&full).min_depth(1).into_iter().filter_entry(|entry| !is_ignored_entry(entry, config));
            for entry in walker {
                let entry = entry.map_err(|err| SitError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
                let suffix = entry
                    .path()
                    .strip_prefix(&full)
                    .expect("walkdir entries are always rooted under full")
                    .to_string_lossy()
                    .replace(std::path::MAIN_SEPARATOR, "/");
                let relative = format!("{relative_root}/{suffix}");

                if entry.file_type().is_dir() {
                    state.insert(relative, TreeNode::Directory);
                    continue;
                }
                if !entry.file_type().is_file() {
                    continue;
                }

                let bytes = std::fs::read(entry.path())?;
                let node = classify(&relative, &bytes, config)?;
                state.insert(relative, node);
            }
        } else if full.is_file() {
            let bytes = std::fs::read(&full)?;
            let node = classify(&relative_root, &bytes, config)?;
            state.insert(relative_root, node);
        }
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scan_classifies_text_and_binary() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "hello world").unwrap();
        std::fs::write(dir.path().join("photo.png"), [0u8, 1, 2, 3]).unwrap();

        let config = ScannerConfig::default();
        let state = scan_working_tree(dir.path(), &config).unwrap();

        assert!(matches!(state.get("readme.txt"), Some(TreeNode::File { content, .. }) if content == "hello world"));
        assert!(matches!(state.get("photo.png"), Some(TreeNode::Binary { .. })));
    }

    #[test]
    fn test_scan_ignores_structural_entries() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("project.sit"), "commit\n").unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules/pkg.js"), "ignored").unwrap();

        let config = ScannerConfig::default();
        let state = scan_working_tree(dir.path(), &config).unwrap();

        assert!(state.get("project.sit").is_none());
        assert!(!state.keys().any(|key| key.starts_with("node_modules")));
    }

    #[test]
    fn test_scan_nul_byte_probe_detects_binary_without_known_extension() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("mystery.dat"), [b'h', b'i', 0, b'x']).unwrap();

        let config = ScannerConfig::default();
        let state = scan_working_tree(dir.path(), &config).unwrap();
        assert!(matches!(state.get("mystery.dat"), Some(TreeNode::Binary { .. })));
    }

    #[test]
    fn test_scan_picks_up_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/file.txt"), "x").unwrap();

        let config = ScannerConfig::default();
        let state = scan_working_tree(dir.path(), &config).unwrap();
        assert_eq!(state.get("sub"), Some(&TreeNode::Directory));
    }

    #[test]
    fn test_scan_paths_only_includes_selected_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();

        let config = ScannerConfig::default();
        let state = scan_paths(dir.path(), &["a.txt".to_string()], &config).unwrap();

        assert!(state.contains_key("a.txt"));
        assert!(!state.contains_key("b.txt"));
    }

    #[test]
    fn test_scan_paths_walks_a_selected_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/file.txt"), "x").unwrap();
        std::fs::write(dir.path().join("outside.txt"), "y").unwrap();

        let config = ScannerConfig::default();
        let state = scan_paths(dir.path(), &["sub".to_string()], &config).unwrap();

        assert_eq!(state.get("sub"), Some(&TreeNode::Directory));
        assert!(state.contains_key("sub/file.txt"));
        assert!(!state.contains_key("outside.txt"));
    }

    #[test]
    fn test_scan_paths_omits_already_deleted_path() {
        let dir = tempdir().unwrap();

        let config = ScannerConfig::default();
        let state = scan_paths(dir.path(), &["gone.txt".to_string()], &config).unwrap();

        assert!(state.get("gone.txt").is_none());
    }
}
