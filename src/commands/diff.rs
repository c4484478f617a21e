//! # Diff Command
//!
//! Show the operations between the committed tree and the working
//! directory, or (with `--staged`) between the committed tree and the
//! currently staged tree.
//!
//! ## Usage
//!
//! ```bash
//! # Unstaged changes: committed tree vs working directory
//! sit diff
//!
//! # Staged changes: committed tree vs staged tree
//! sit diff --staged
//! ```

use anyhow::Result;

use crate::config::ScannerConfig;
use crate::diff::diff_trees;
use crate::operation::Operation;
use crate::scan::scan_working_tree;
use crate::Repository;

fn describe(op: &Operation) -> String {
    match op {
        Operation::Touch { path } => format!("create  {path}"),
        Operation::Write { path, .. } => format!("write   {path}"),
        Operation::Binary { path, .. } => format!("binary  {path}"),
        Operation::Delete { path } => format!("delete  {path}"),
        Operation::Mkdir { path } => format!("mkdir   {path}"),
        Operation::Rename { from, to } => format!("rename  {from} -> {to}"),
        Operation::Patch { path, .. } => format!("patch   {path}"),
    }
}

/// Execute the diff command.
///
/// # Example
///
/// ```no_run
/// use sit::commands::diff::run;
///
/// run(false).unwrap();
/// ```
pub fn run(staged: bool) -> Result<()> {
    let repo = Repository::find()?;
    let config = ScannerConfig::default();
    let committed = repo.committed_tree()?;

    let comparand = if staged { repo.staged_tree()? } else { scan_working_tree(&repo.root, &config)? };

    let ops = diff_trees(&committed, &comparand, &config);
    if ops.is_empty() {
        println!("no changes");
    } else {
        for op in &ops {
            println!("{}", describe(op));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_diff_reports_no_changes_on_clean_tree() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        let repo = Repository::find_from(temp.path()).unwrap();

        let committed = repo.committed_tree().unwrap();
        let working = scan_working_tree(&repo.root, &ScannerConfig::default()).unwrap();
        assert!(diff_trees(&committed, &working, &ScannerConfig::default()).is_empty());
    }
}
