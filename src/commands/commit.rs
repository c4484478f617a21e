//! # Commit Command
//!
//! Seal the staged operations into a new commit.
//!
//! ## Usage
//!
//! ```bash
//! sit commit -m "Commit message"
//! ```

use anyhow::Result;

use crate::Repository;

/// Execute the commit command.
///
/// # Example
///
/// ```no_run
/// use sit::commands::commit::run;
///
/// run("Initial commit").unwrap();
/// ```
pub fn run(message: &str) -> Result<()> {
    let repo = Repository::find()?;
    let commit = repo.commit(message)?;

    let short_id = &commit.id[..7.min(commit.id.len())];
    println!("[{}] {}", short_id, message);

    Ok(())
}
