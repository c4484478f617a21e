//! # Add Command
//!
//! Stage the working directory's changes by diffing it (or a selected
//! subset of it) against the staged tree.
//!
//! ## Usage
//!
//! ```bash
//! sit add
//! sit add favicon.ico
//! sit add src/ docs/readme.md
//! ```

use anyhow::Result;

use crate::config::ScannerConfig;
use crate::Repository;

/// Execute the add command: recompute the staged operations from a
/// fresh scan of `paths`, or the whole working directory when `paths`
/// is empty.
///
/// # Example
///
/// ```no_run
/// use sit::commands::add::run;
///
/// run(&[]).unwrap();
/// ```
pub fn run(paths: &[String]) -> Result<()> {
    let repo = Repository::find()?;
    let config = ScannerConfig::default();

    let ops = repo.add(paths, &config)?;
    println!("staged {} change(s)", ops.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_add_stages_new_file() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("test.txt"), "test content").unwrap();

        let ops = repo.add(&[], &ScannerConfig::default()).unwrap();
        assert_eq!(ops.len(), 1);
    }

    #[test]
    fn test_add_with_explicit_path_stages_only_that_path() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        std::fs::write(temp.path().join("b.txt"), "b").unwrap();

        let ops = repo.add(&["a.txt".to_string()], &ScannerConfig::default()).unwrap();
        assert_eq!(ops.len(), 1);

        let staged = repo.staged_tree().unwrap();
        assert!(staged.contains_key("a.txt"));
        assert!(!staged.contains_key("b.txt"));
    }
}
