//! # Tree Folder
//!
//! Reduces a prefix of the operation log into a [`TreeState`]: a flat,
//! deterministic snapshot of every path the log has produced so far.
//! The fold is a pure left-to-right reduction with no hidden state, so
//! replaying the same prefix always yields the same tree — that
//! determinism is also why `TreeState` is keyed by a `BTreeMap` rather
//! than a hash map: path order falls out for free instead of needing a
//! separate sort step wherever the Differ or `ls` wants it.
//!
//! `delete` and `rename` act on the exact path given, not its
//! descendants — deleting a directory that still has tracked children
//! leaves those children's entries stale in the map. Recursive cleanup
//! is the Differ's job: it emits one `delete` per removed path, so by
//! the time the folder sees them every descendant already has its own
//! record.

use crate::error::SitError;
use crate::hash::Hash;
use crate::operation::Operation;
use crate::patch::apply_patch;
use std::collections::BTreeMap;

/// What a path in the tree currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// A text file, its full content and content hash.
    File { content: String, hash: Hash },
    /// A binary file, its content (base64-encoded, as stored) and size.
    Binary { content_base64: String, size: u64, hash: Hash },
    /// A directory with no content of its own.
    Directory,
}

/// A full snapshot of the tree: path to node, sorted by path.
pub type TreeState = BTreeMap<String, TreeNode>;

/// Fold a sequence of operations into a `TreeState`, starting from an
/// empty tree.
///
/// If `stop_at` is given, folding halts *after* processing the
/// operation for which the predicate returns `true` (used to compute
/// `committedTree` as the fold up to and including a given commit's
/// operations, versus `stagedTree` which folds everything).
pub fn fold<'a, I>(operations: I, stop_after: Option<&dyn Fn(usize) -> bool>) -> Result<TreeState, SitError>
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut state = TreeState::new();

    for (index, op) in operations.into_iter().enumerate() {
        apply_operation(&mut state, op)?;

        if let Some(stop_after) = stop_at_matches(stop_after, index) {
            if stop_after {
                break;
            }
        }
    }

    Ok(state)
}

fn stop_at_matches(stop_after: Option<&dyn Fn(usize) -> bool>, index: usize) -> Option<bool> {
    stop_after.map(|predicate| predicate(index))
}

fn apply_operation(state: &mut TreeState, op: &Operation) -> Result<(), SitError> {
    match op {
        Operation::Touch { path } => {
            state.insert(path.clone(), TreeNode::File { content: String::new(), hash: crate::hash::empty_blob_hash() });
        }
        Operation::Write { path, hash, content } => {
            state.insert(path.clone(), TreeNode::File { content: content.clone(), hash: hash.clone() });
        }
        Operation::Binary { path, hash, size, content_base64 } => {
            state.insert(
                path.clone(),
                TreeNode::Binary { content_base64: content_base64.clone(), size: *size, hash: hash.clone() },
            );
        }
        Operation::Delete { path } => {
            state.remove(path).ok_or_else(|| SitError::MalformedRecord {
                detail: format!("delete targets path not present in tree: {path}"),
            })?;
        }
        Operation::Mkdir { path } => {
            state.insert(path.clone(), TreeNode::Directory);
        }
        Operation::Rename { from, to } => {
            let node = state.remove(from).ok_or_else(|| SitError::MalformedRecord {
                detail: format!("rename source not present in tree: {from}"),
            })?;
            state.insert(to.clone(), node);
        }
        Operation::Patch { path, hash, script } => {
            let node = state.get(path).ok_or_else(|| SitError::MalformedRecord {
                detail: format!("patch targets path not present in tree: {path}"),
            })?;
            let old_content = match node {
                TreeNode::File { content, .. } => content.clone(),
                _ => {
                    return Err(SitError::MalformedRecord {
                        detail: format!("patch targets a non-text path: {path}"),
                    })
                }
            };
            let ops = crate::patch::parse_ops(script)?;
            let new_content = apply_patch(&old_content, &ops)?;
            state.insert(path.clone(), TreeNode::File { content: new_content, hash: hash.clone() });
        }
    }

    Ok(())
}
