//! # Ls Command
//!
//! List the paths in a tree: the staged tree by default, or a specific
//! commit's tree when given a query.
//!
//! ## Usage
//!
//! ```bash
//! # List the currently staged tree
//! sit ls
//!
//! # List the tree at a specific commit
//! sit ls 3
//! ```

use anyhow::Result;

use crate::tree::TreeNode;
use crate::Repository;

fn kind_marker(node: &TreeNode) -> &'static str {
    match node {
        TreeNode::Directory => "dir",
        TreeNode::File { .. } => "file",
        TreeNode::Binary { .. } => "bin",
    }
}

/// Execute the ls command.
///
/// # Example
///
/// ```no_run
/// use sit::commands::ls::run;
///
/// run(None).unwrap();
/// ```
pub fn run(query: Option<&str>) -> Result<()> {
    let repo = Repository::find()?;

    let tree = match query {
        Some(query) => {
            let commit = repo.find_commit(query)?;
            repo.tree_at(&commit.id)?
        }
        None => repo.staged_tree()?,
    };

    for (path, node) in tree.iter() {
        println!("{:<4} {path}", kind_marker(node));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScannerConfig;
    use tempfile::tempdir;

    #[test]
    fn test_ls_lists_staged_paths() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), "hi").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();

        let tree = repo.staged_tree().unwrap();
        assert!(tree.contains_key("a.txt"));
    }
}
