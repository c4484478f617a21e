//! # Sit — a history-file version-control system
//!
//! Sit represents a project's entire history as a single append-only
//! plain-text file (the *history file*). That file interleaves two kinds
//! of records: change operations describing edits to a virtual filesystem
//! tree, and commit records that cryptographically seal a prefix of
//! operations into an ordered, parent-linked chain.
//!
//! ## Architecture Overview
//!
//! Unlike a content-addressable object store, Sit keeps no object
//! database and no index file. The parsed record sequence *is* the
//! repository; every tree state is obtained by folding a prefix of that
//! sequence. This trades O(1) checkout for a single, simple source of
//! truth with no cache-coherence surface.
//!
//! ### Record kinds
//!
//! - **Operation**: `touch`, `write`, `binary`, `delete`, `mkdir`,
//!   `rename`, `patch` — edits to the virtual tree.
//! - **Commit**: seals every operation since the previous commit into an
//!   ordered, hash-linked chain.
//! - **Stash**: holds previously-staged operations, inert with respect
//!   to folding.
//!
//! ### Repository Structure
//!
//! ```text
//! project/
//! ├── project.sit      # the entire history: operations + commits
//! └── ...               # the working directory itself
//! ```
//!
//! ## Usage Example
//!
//! ```bash
//! # Initialize a new repository
//! sit init
//!
//! # Stage the working directory
//! sit add .
//!
//! # Seal the staged operations into a commit
//! sit commit -m "Initial commit"
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod hash;
pub mod log;
pub mod operation;
pub mod patch;
pub mod repo;
pub mod scan;
pub mod tree;

pub mod commands;

use std::path::{Path, PathBuf};

pub use error::SitError;

/// Extension used for the history file (`<dirname>.sit`).
pub const HISTORY_EXTENSION: &str = "sit";

/// A handle on a Sit repository: the working directory root plus the
/// path to its history file.
///
/// Unlike an object-store VCS, there is no `.sit/` directory — the
/// history file sits alongside the working tree it describes.
#[derive(Debug, Clone)]
pub struct Repository {
    /// The working directory root (the history file's parent).
    pub root: PathBuf,
    /// Path to the `<dirname>.sit` history file.
    pub history_path: PathBuf,
}

impl Repository {
    /// Find the repository by walking up from the current directory.
    pub fn find() -> Result<Self, SitError> {
        let current_dir = std::env::current_dir()?;
        Self::find_from(&current_dir)
    }

    /// Find the repository starting from a specific path.
    ///
    /// Walks upward looking for a `<dirname>.sit` file in each ancestor
    /// directory.
    pub fn find_from(start: &Path) -> Result<Self, SitError> {
        let mut current = start.to_path_buf();

        loop {
            if let Some(history_path) = history_file_in(&current) {
                return Ok(Self {
                    root: current,
                    history_path,
                });
            }

            if !current.pop() {
                return Err(SitError::NotARepository);
            }
        }
    }

    /// Initialize a new repository at `path`.
    ///
    /// Fails with [`SitError::AlreadyARepository`] if a `*.sit` file
    /// already exists in `path`.
    pub fn init(path: &Path) -> Result<Self, SitError> {
        std::fs::create_dir_all(path)?;
        // Resolve to an absolute path before reading `file_name()` — a
        // relative path like "." has no file name of its own and would
        // otherwise fall back to a generic repository name instead of
        // the actual directory's.
        let root = std::fs::canonicalize(path)?;

        if history_file_in(&root).is_some() {
            return Err(SitError::AlreadyARepository);
        }

        let history_path = default_history_path(&root);
        repo::write_initial_commit(&history_path)?;

        tracing::info!(path = %history_path.display(), "initialized repository");

        Ok(Self { root, history_path })
    }
}

/// Look for a `*.sit` file directly inside `dir`. Returns the first one
/// found (a directory is expected to hold exactly one).
fn history_file_in(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(HISTORY_EXTENSION) {
            return Some(path);
        }
    }
    None
}

/// The canonical `<dirname>.sit` path for a freshly initialized repository.
fn default_history_path(root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "project".to_string());
    root.join(format!("{name}.{HISTORY_EXTENSION}"))
}
