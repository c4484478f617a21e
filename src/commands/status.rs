//! # Status Command
//!
//! Show the working tree status: staged operations (committed tree vs
//! staged tree) and unstaged operations (staged tree vs working
//! directory).
//!
//! ## Usage
//!
//! ```bash
//! sit status
//! ```

use anyhow::Result;

use crate::config::ScannerConfig;
use crate::diff::diff_trees;
use crate::operation::Operation;
use crate::scan::scan_working_tree;
use crate::Repository;

fn path_of(op: &Operation) -> String {
    match op {
        Operation::Rename { from, to } => format!("{from} -> {to}"),
        other => other.primary_path().to_string(),
    }
}

fn print_section(title: &str, ops: &[Operation]) {
    if ops.is_empty() {
        return;
    }
    println!("{title}:");
    for op in ops {
        println!("        {}", path_of(op));
    }
    println!();
}

/// Execute the status command.
///
/// # Example
///
/// ```no_run
/// use sit::commands::status::run;
///
/// run().unwrap();
/// ```
pub fn run() -> Result<()> {
    let repo = Repository::find()?;
    let config = ScannerConfig::default();

    let committed = repo.committed_tree()?;
    let staged = repo.staged_tree()?;
    let working = scan_working_tree(&repo.root, &config)?;

    let staged_ops = diff_trees(&committed, &staged, &config);
    let unstaged_ops = diff_trees(&staged, &working, &config);

    if staged_ops.is_empty() && unstaged_ops.is_empty() {
        println!("nothing to commit, working tree clean");
        return Ok(());
    }

    print_section("Changes staged for commit", &staged_ops);
    print_section("Changes not staged for commit", &unstaged_ops);

    Ok(())
}
