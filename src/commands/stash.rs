//! # Stash Command
//!
//! Park the currently staged operations into a `stash` record, clearing
//! the stage without discarding the work.
//!
//! ## Usage
//!
//! ```bash
//! sit stash
//! ```

use anyhow::Result;

use crate::Repository;

/// Execute the stash command.
///
/// # Example
///
/// ```no_run
/// use sit::commands::stash::run;
///
/// run().unwrap();
/// ```
pub fn run() -> Result<()> {
    let repo = Repository::find()?;
    repo.stash()?;
    println!("stashed staged changes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScannerConfig;
    use tempfile::tempdir;

    #[test]
    fn test_stash_clears_stage() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), "hi").unwrap();
        repo.add(&[], &ScannerConfig::default()).unwrap();

        repo.stash().unwrap();
        assert_eq!(repo.staged_tree().unwrap(), repo.committed_tree().unwrap());
    }
}
