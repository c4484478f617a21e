//! # Checkout Command
//!
//! Materialize a past commit's tree onto the working directory, or (with
//! no query) fast-forward it to the currently staged tree.
//!
//! ## Usage
//!
//! ```bash
//! # Check out by commit order
//! sit checkout 3
//!
//! # Check out by hash prefix
//! sit checkout a1b2c3d
//!
//! # Fast-forward to the staged tree
//! sit checkout
//! ```

use anyhow::Result;

use crate::config::ScannerConfig;
use crate::Repository;

/// Execute the checkout command.
///
/// Refuses with [`crate::SitError::DirtyWorkingTree`] if the working
/// directory doesn't exactly match the currently staged tree — `sit`
/// has no merge machinery, so checking out over unstaged edits would
/// silently discard them.
///
/// # Example
///
/// ```no_run
/// use sit::commands::checkout::run;
///
/// run(Some("0")).unwrap();
/// run(None).unwrap();
/// ```
pub fn run(query: Option<&str>) -> Result<()> {
    let repo = Repository::find()?;
    let commit = repo.checkout(query, &ScannerConfig::default())?;

    match commit {
        Some(commit) => {
            println!("checked out commit {} (order {})", &commit.id[..7.min(commit.id.len())], commit.order);
        }
        None => println!("checked out staged tree"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_checkout_restores_earlier_content() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        std::fs::write(temp.path().join("a.txt"), "one").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();
        let first = repo.commit("v1").unwrap();

        std::fs::write(temp.path().join("a.txt"), "two").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();
        repo.commit("v2").unwrap();

        repo.checkout(Some(&first.id), &ScannerConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(temp.path().join("a.txt")).unwrap(), "one");
    }

    #[test]
    fn test_checkout_with_no_query_fast_forwards_to_staged_tree() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        std::fs::write(temp.path().join("a.txt"), "one").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();
        let first = repo.commit("v1").unwrap();

        std::fs::write(temp.path().join("a.txt"), "two").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();

        repo.checkout(Some(&first.id), &ScannerConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(temp.path().join("a.txt")).unwrap(), "one");

        repo.checkout(None, &ScannerConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(temp.path().join("a.txt")).unwrap(), "two");
    }
}
