//! # Differ
//!
//! Computes the minimal sequence of [`Operation`]s that turns one
//! `TreeState` into another — used both to turn "working tree vs.
//! committed tree" into the operations `add` stages, and (conceptually)
//! any tree-to-tree comparison the rest of the crate might want.
//!
//! Output order is fixed: creates and in-place updates first, then
//! deletes, then renames — renames are detected as a delete/create pair
//! with identical content and are promoted out of the delete and create
//! lists once found, so emitting them last keeps the earlier lists
//! describing only genuine creates and deletes.

use crate::config::ScannerConfig;
use crate::hash::Hash;
use crate::operation::Operation;
use crate::patch::{diff_text, serialize_ops, should_use_patch};
use crate::tree::{TreeNode, TreeState};

fn node_hash(node: &TreeNode) -> Option<&Hash> {
    match node {
        TreeNode::File { hash, .. } => Some(hash),
        TreeNode::Binary { hash, .. } => Some(hash),
        TreeNode::Directory => None,
    }
}

/// Diff `old` against `new`, producing the operations that fold `old`
/// forward into `new`. Every path absent from `new` is eligible for
/// `delete`.
pub fn diff_trees(old: &TreeState, new: &TreeState, config: &ScannerConfig) -> Vec<Operation> {
    diff_trees_impl(old, new, config, None)
}

/// Like [`diff_trees`], but a path absent from `new` only becomes a
/// `delete` when it is also covered by `selector` (equal to, or nested
/// under, one of the caller-supplied paths) — per the path-selector rule
/// an `add <paths…>` invocation must honor: a file the caller never
/// named is never staged as deleted, no matter what a full scan would
/// have shown.
pub fn diff_trees_selected(old: &TreeState, new: &TreeState, config: &ScannerConfig, selector: &[String]) -> Vec<Operation> {
    diff_trees_impl(old, new, config, Some(selector))
}

fn path_covered_by_selector(path: &str, selector: &[String]) -> bool {
    selector.iter().any(|selected| {
        let selected = selected.trim_end_matches('/');
        path == selected || path.starts_with(&format!("{selected}/"))
    })
}

fn diff_trees_impl(old: &TreeState, new: &TreeState, config: &ScannerConfig, selector: Option<&[String]>) -> Vec<Operation> {
    let mut creates_and_updates = Vec::new();
    let mut deletes: Vec<String> = Vec::new();

    for (path, new_node) in new.iter() {
        match old.get(path) {
            None => {
                creates_and_updates.push(create_operation(path, new_node));
            }
            Some(old_node) if old_node != new_node => {
                creates_and_updates.push(update_operation(path, old_node, new_node, config));
            }
            Some(_) => {}
        }
    }

    for path in old.keys() {
        let eligible = match selector {
            Some(paths) => path_covered_by_selector(path, paths),
            None => true,
        };
        if !new.contains_key(path) && eligible {
            deletes.push(path.clone());
        }
    }

    let (renames, remaining_deletes, remaining_creates) = detect_renames(deletes, creates_and_updates, old, new);

    let mut ops = remaining_creates;
    ops.extend(remaining_deletes.into_iter().map(|path| Operation::Delete { path }));
    ops.extend(renames);
    ops
}

fn create_operation(path: &str, node: &TreeNode) -> Operation {
    match node {
        TreeNode::Directory => Operation::Mkdir { path: path.to_string() },
        TreeNode::File { content, hash } if content.is_empty() => {
            let _ = hash;
            Operation::Touch { path: path.to_string() }
        }
        TreeNode::File { content, hash } => Operation::Write { path: path.to_string(), hash: hash.clone(), content: content.clone() },
        TreeNode::Binary { content_base64, size, hash } => Operation::Binary {
            path: path.to_string(),
            hash: hash.clone(),
            size: *size,
            content_base64: content_base64.clone(),
        },
    }
}

fn update_operation(path: &str, old_node: &TreeNode, new_node: &TreeNode, config: &ScannerConfig) -> Operation {
    match (old_node, new_node) {
        (TreeNode::File { content: old_content, .. }, TreeNode::File { content: new_content, hash }) => {
            let ops = diff_text(old_content, new_content);
            if should_use_patch(old_content, &ops, config.patch_threshold_ratio) {
                Operation::Patch { path: path.to_string(), hash: hash.clone(), script: serialize_ops(&ops) }
            } else {
                Operation::Write { path: path.to_string(), hash: hash.clone(), content: new_content.clone() }
            }
        }
        _ => create_operation(path, new_node),
    }
}

/// Pair deleted paths with created paths of identical content, promoting
/// them to `rename` operations. Pairing is first-match-wins in the
/// deletes' path order, against the creates' path order.
fn detect_renames(
    deletes: Vec<String>,
    creates: Vec<Operation>,
    old: &TreeState,
    new: &TreeState,
) -> (Vec<Operation>, Vec<String>, Vec<Operation>) {
    let mut remaining_creates = creates;
    let mut remaining_deletes = Vec::new();
    let mut renames = Vec::new();

    for deleted_path in deletes {
        let deleted_hash = old.get(&deleted_path).and_then(node_hash).cloned();

        let match_index = deleted_hash.as_ref().and_then(|deleted_hash| {
            remaining_creates.iter().position(|op| matches_deleted_content(op, deleted_hash, new))
        });

        match match_index {
            Some(index) => {
                let created = remaining_creates.remove(index);
                let to = created.primary_path().to_string();
                renames.push(Operation::Rename { from: deleted_path, to });
            }
            None => remaining_deletes.push(deleted_path),
        }
    }

    (renames, remaining_deletes, remaining_creates)
}

fn matches_deleted_content(created: &Operation, deleted_hash: &Hash, new: &TreeState) -> bool {
    let created_path = created.primary_path();
    match new.get(created_path).and_then(node_hash) {
        Some(hash) => hash == deleted_hash,
        None => false,
    }
}
