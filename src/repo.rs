//! # Repository
//!
//! Orchestrates every command against the history file: `init`, `add`,
//! `reset`, `stash`, `unstash`, `commit`, `find_commit`, `checkout`.
//!
//! Reads take a shared advisory lock, mutations an exclusive one
//! (`fs2`), so two `sit` invocations against the same history file never
//! interleave their writes. Every mutation that isn't a pure append
//! (`reset`, `stash`, `unstash`) still follows the same durability
//! recipe as [`crate::log::append_record`]: build the whole next file
//! content in memory, write it in one call, then `fsync`.

use crate::config::ScannerConfig;
use crate::diff::{diff_trees, diff_trees_selected};
use crate::error::SitError;
use crate::hash::{commit_hash, Hash};
use crate::log::{self, Record};
use crate::operation::{CommitRecord, Operation, StashRecord};
use crate::scan::{scan_paths, scan_working_tree};
use crate::tree::{fold, TreeState};
use crate::Repository;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

fn author() -> String {
    std::env::var("USER").unwrap_or_else(|_| "Unknown".to_string())
}

fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn with_shared_lock<T>(path: &Path, body: impl FnOnce() -> Result<T, SitError>) -> Result<T, SitError> {
    let file = File::open(path)?;
    file.lock_shared()?;
    let result = body();
    file.unlock()?;
    result
}

fn with_exclusive_lock<T>(path: &Path, body: impl FnOnce() -> Result<T, SitError>) -> Result<T, SitError> {
    let file = OpenOptions::new().read(true).write(true).create(true).open(path)?;
    file.lock_exclusive()?;
    let result = body();
    file.unlock()?;
    result
}

fn read_records(path: &Path) -> Result<Vec<Record>, SitError> {
    let text = std::fs::read_to_string(path)?;
    log::parse_records(&text)
}

/// Atomically replace the whole history file's contents.
fn rewrite_records(path: &Path, records: &[Record]) -> Result<(), SitError> {
    let text = log::serialize_records(records);
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.sync_data()?;
    Ok(())
}

fn last_commit_index(records: &[Record]) -> Option<usize> {
    records.iter().rposition(|record| record.cue == "commit")
}

fn operations_from(records: &[Record]) -> Result<Vec<Operation>, SitError> {
    records.iter().filter_map(|record| Operation::from_record(record).transpose()).collect()
}

/// Write the very first record of a brand new history file: an initial
/// commit sealing zero operations.
pub fn write_initial_commit(history_path: &Path) -> Result<(), SitError> {
    let timestamp = now_iso8601();
    let author = author();
    let message = "Initial commit";
    let id = commit_hash(&author, &timestamp, message, None, None);

    let commit =
        CommitRecord { author, timestamp, order: 1, id, parent: None, message: Some(message.to_string()) };
    log::append_record(history_path, &commit.to_record())
}

impl Repository {
    /// The tree as of the last commit (operations up to and including the
    /// last sealed prefix).
    pub fn committed_tree(&self) -> Result<TreeState, SitError> {
        with_shared_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let boundary = last_commit_index(&records).map(|index| index + 1).unwrap_or(0);
            let operations = operations_from(&records[..boundary])?;
            fold(&operations, None)
        })
    }

    /// The tree as of every operation recorded so far, staged or not.
    pub fn staged_tree(&self) -> Result<TreeState, SitError> {
        with_shared_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let operations = operations_from(&records)?;
            fold(&operations, None)
        })
    }

    /// The operation records appended after the last commit: what `add`,
    /// `reset`, `stash`, and `commit` all act on.
    fn staged_records(&self, records: &[Record]) -> Vec<Record> {
        let boundary = last_commit_index(records).map(|index| index + 1).unwrap_or(0);
        records[boundary..].iter().filter(|record| Operation::is_operation_cue(&record.cue)).cloned().collect()
    }

    /// Diff a fresh scan of the working directory against the staged
    /// tree and append the resulting operations as new staged records.
    ///
    /// `paths` is a selector: when empty, the whole working directory is
    /// scanned and diffed (`sit add` with no arguments). When non-empty,
    /// only those paths are scanned, and only those paths are eligible
    /// to produce a `delete` — a file the caller didn't name is never
    /// staged as deleted just because it wasn't looked at.
    pub fn add(&self, paths: &[String], config: &ScannerConfig) -> Result<Vec<Operation>, SitError> {
        with_exclusive_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let operations = operations_from(&records)?;
            let staged_tree = fold(&operations, None)?;

            let new_ops = if paths.is_empty() {
                let working_tree = scan_working_tree(&self.root, config)?;
                diff_trees(&staged_tree, &working_tree, config)
            } else {
                let working_tree = scan_paths(&self.root, paths, config)?;
                diff_trees_selected(&staged_tree, &working_tree, config, paths)
            };

            let new_records: Vec<Record> = new_ops.iter().map(Operation::to_record).collect();
            log::append_records(&self.history_path, &new_records)?;

            tracing::info!(count = new_ops.len(), "staged changes");
            Ok(new_ops)
        })
    }

    /// Drop every staged (uncommitted) operation. No-op if nothing is
    /// staged.
    pub fn reset(&self) -> Result<(), SitError> {
        with_exclusive_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let boundary = last_commit_index(&records).map(|index| index + 1).unwrap_or(0);

            if self.staged_records(&records).is_empty() {
                return Ok(());
            }

            rewrite_records(&self.history_path, &records[..boundary])?;
            tracing::info!("reset staged changes");
            Ok(())
        })
    }

    /// Park the currently staged operations into a `stash` record.
    /// No-op if nothing is staged.
    pub fn stash(&self) -> Result<(), SitError> {
        with_exclusive_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let boundary = last_commit_index(&records).map(|index| index + 1).unwrap_or(0);
            let staged = self.staged_records(&records);

            if staged.is_empty() {
                return Ok(());
            }

            let operations = operations_from(&staged)?;
            let stash = StashRecord { operations };

            let mut next_records = records[..boundary].to_vec();
            next_records.push(stash.to_record());
            rewrite_records(&self.history_path, &next_records)?;

            tracing::info!("stashed staged changes");
            Ok(())
        })
    }

    /// Restore the most recently stashed operations back onto the stage.
    pub fn unstash(&self) -> Result<(), SitError> {
        with_exclusive_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let boundary = last_commit_index(&records).map(|index| index + 1).unwrap_or(0);

            let stash_index = records[boundary..]
                .iter()
                .rposition(|record| record.cue == "stash")
                .map(|index| boundary + index)
                .ok_or_else(|| SitError::UnknownTarget { query: "stash".to_string() })?;

            let stash = StashRecord::from_record(&records[stash_index])?;

            let mut next_records = records.clone();
            next_records.remove(stash_index);
            next_records.extend(stash.operations.iter().map(Operation::to_record));
            rewrite_records(&self.history_path, &next_records)?;

            tracing::info!(count = stash.operations.len(), "restored stashed changes");
            Ok(())
        })
    }

    /// Seal the currently staged operations into a new commit.
    pub fn commit(&self, message: &str) -> Result<CommitRecord, SitError> {
        with_exclusive_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let staged = self.staged_records(&records);

            if staged.is_empty() {
                return Err(SitError::EmptyStage);
            }

            let previous = records
                .iter()
                .rev()
                .find(|record| record.cue == "commit")
                .map(|record| CommitRecord::from_record(record))
                .transpose()?;

            let order = previous.as_ref().map(|commit| commit.order + 1).unwrap_or(0);
            let parent = previous.map(|commit| commit.id);

            let staged_ops_text = log::serialize_records(&staged).trim_end_matches('\n').to_string();
            let author = author();
            let timestamp = now_iso8601();
            let id = commit_hash(&author, &timestamp, message, parent.as_deref(), Some(&staged_ops_text));

            let commit = CommitRecord {
                author,
                timestamp,
                order,
                id,
                parent,
                message: if message.is_empty() { None } else { Some(message.to_string()) },
            };

            log::append_record(&self.history_path, &commit.to_record())?;
            tracing::info!(id = %commit.id, order, "committed");
            Ok(commit)
        })
    }

    /// Find a commit by full hash, unambiguous hash prefix, or order
    /// number.
    pub fn find_commit(&self, query: &str) -> Result<CommitRecord, SitError> {
        with_shared_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let commits: Vec<CommitRecord> = records
                .iter()
                .filter(|record| record.cue == "commit")
                .map(CommitRecord::from_record)
                .collect::<Result<_, _>>()?;

            if let Ok(order) = query.parse::<u64>() {
                return commits
                    .iter()
                    .find(|commit| commit.order == order)
                    .cloned()
                    .ok_or_else(|| SitError::UnknownTarget { query: query.to_string() });
            }

            commits
                .iter()
                .find(|commit| commit.id.contains(query))
                .cloned()
                .ok_or_else(|| SitError::UnknownTarget { query: query.to_string() })
        })
    }

    /// The tree as of a specific commit (operations up through, but not
    /// past, that commit's sealed prefix).
    pub fn tree_at(&self, commit_id: &Hash) -> Result<TreeState, SitError> {
        with_shared_lock(&self.history_path, || {
            let records = read_records(&self.history_path)?;
            let commit_index = records
                .iter()
                .position(|record| record.cue == "commit" && CommitRecord::from_record(record).map(|c| &c.id == commit_id).unwrap_or(false))
                .ok_or_else(|| SitError::UnknownTarget { query: commit_id.clone() })?;

            let operations = operations_from(&records[..commit_index])?;
            fold(&operations, None)
        })
    }

    /// Materialize a target tree onto the working directory: either a
    /// specific commit's tree, or (when `query` is absent) the current
    /// staged tree, "fast-forwarding" the working directory to match it.
    /// Refuses if the working tree doesn't match the current staged tree.
    pub fn checkout(&self, query: Option<&str>, config: &ScannerConfig) -> Result<Option<CommitRecord>, SitError> {
        let current_tree = self.staged_tree()?;
        let working_tree = scan_working_tree(&self.root, config)?;
        if !diff_trees(&current_tree, &working_tree, config).is_empty() {
            return Err(SitError::DirtyWorkingTree);
        }

        let (target_tree, commit) = match query {
            Some(query) => {
                let commit = self.find_commit(query)?;
                (self.tree_at(&commit.id)?, Some(commit))
            }
            None => (current_tree.clone(), None),
        };

        materialize(&self.root, &current_tree, &target_tree)?;

        match &commit {
            Some(commit) => tracing::info!(id = %commit.id, "checked out commit"),
            None => tracing::info!("checked out staged tree"),
        }
        Ok(commit)
    }
}

/// Write `target` onto disk at `root`. Tracked files absent from
/// `target` are deleted; tracked directories that become empty as a
/// result are removed deepest-first (errors skipped, since a directory
/// left non-empty by untracked content should survive).
fn materialize(root: &Path, current: &TreeState, target: &TreeState) -> Result<(), SitError> {
    use crate::tree::TreeNode;
    use base64::Engine;

    let mut tracked_dirs: Vec<&String> = Vec::new();
    for (path, node) in current.iter() {
        match node {
            TreeNode::Directory => tracked_dirs.push(path),
            TreeNode::File { .. } | TreeNode::Binary { .. } => {
                if !target.contains_key(path) {
                    let _ = std::fs::remove_file(root.join(path));
                }
            }
        }
    }

    tracked_dirs.sort_by_key(|path| std::cmp::Reverse(path.matches('/').count()));
    for path in tracked_dirs {
        if !target.contains_key(path) {
            let _ = std::fs::remove_dir(root.join(path));
        }
    }

    for (path, node) in target.iter() {
        let full = root.join(path);
        match node {
            TreeNode::Directory => {
                std::fs::create_dir_all(&full)?;
            }
            TreeNode::File { content, .. } => {
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&full, content)?;
            }
            TreeNode::Binary { content_base64, .. } => {
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(content_base64)
                    .map_err(|_| SitError::MalformedRecord { detail: format!("invalid base64 content for {path}") })?;
                std::fs::write(&full, bytes)?;
            }
        }
    }

    Ok(())
}

impl Operation {
    /// Whether a cue word names an operation record (as opposed to
    /// `commit` or `stash`).
    fn is_operation_cue(cue: &str) -> bool {
        matches!(cue, "touch" | "write" | "binary" | "delete" | "mkdir" | "rename" | "patch")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_add_stages_new_files() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let config = ScannerConfig::default();
        let ops = repo.add(&[], &config).unwrap();
        assert_eq!(ops.len(), 1);

        let staged = repo.staged_tree().unwrap();
        assert!(staged.contains_key("a.txt"));
    }

    #[test]
    fn test_commit_requires_staged_changes() {
        let (_dir, repo) = init_repo();
        let err = repo.commit("nothing to see").unwrap_err();
        assert!(matches!(err, SitError::EmptyStage));
    }

    #[test]
    fn test_commit_seals_staged_changes() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();

        let commit = repo.commit("add a.txt").unwrap();
        assert_eq!(commit.order, 2);
        assert_eq!(commit.message.as_deref(), Some("add a.txt"));

        let committed = repo.committed_tree().unwrap();
        assert!(committed.contains_key("a.txt"));
    }

    #[test]
    fn test_reset_drops_staged_changes() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();

        repo.reset().unwrap();
        let staged = repo.staged_tree().unwrap();
        assert!(!staged.contains_key("a.txt"));
    }

    #[test]
    fn test_reset_is_noop_with_nothing_staged() {
        let (_dir, repo) = init_repo();
        repo.reset().unwrap();
        assert_eq!(repo.staged_tree().unwrap(), repo.committed_tree().unwrap());
    }

    #[test]
    fn test_stash_then_unstash_roundtrips() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();

        repo.stash().unwrap();
        assert!(!repo.staged_tree().unwrap().contains_key("a.txt"));

        repo.unstash().unwrap();
        assert!(repo.staged_tree().unwrap().contains_key("a.txt"));
    }

    #[test]
    fn test_unstash_without_stash_is_unknown_target() {
        let (_dir, repo) = init_repo();
        let err = repo.unstash().unwrap_err();
        assert!(matches!(err, SitError::UnknownTarget { .. }));
    }

    #[test]
    fn test_find_commit_by_order_and_prefix() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();
        let commit = repo.commit("first").unwrap();

        let by_order = repo.find_commit("2").unwrap();
        assert_eq!(by_order.id, commit.id);

        let prefix = &commit.id[..8];
        let by_prefix = repo.find_commit(prefix).unwrap();
        assert_eq!(by_prefix.id, commit.id);
    }

    #[test]
    fn test_checkout_materializes_earlier_tree() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "version one").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();
        let first = repo.commit("v1").unwrap();

        std::fs::write(dir.path().join("a.txt"), "version two").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();
        repo.commit("v2").unwrap();

        repo.checkout(Some(&first.id), &ScannerConfig::default()).unwrap();
        let content = std::fs::read_to_string(dir.path().join("a.txt")).unwrap();
        assert_eq!(content, "version one");
    }

    #[test]
    fn test_checkout_refuses_dirty_working_tree() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "version one").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();
        let first = repo.commit("v1").unwrap();

        std::fs::write(dir.path().join("a.txt"), "uncommitted edit").unwrap();

        let err = repo.checkout(Some(&first.id), &ScannerConfig::default()).unwrap_err();
        assert!(matches!(err, SitError::DirtyWorkingTree));
    }

    #[test]
    fn test_checkout_with_no_query_restores_staged_tree() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "version one").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();
        let first = repo.commit("v1").unwrap();

        std::fs::write(dir.path().join("a.txt"), "version two").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();

        repo.checkout(Some(&first.id), &ScannerConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "version one");

        repo.checkout(None, &ScannerConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "version two");
    }
}
