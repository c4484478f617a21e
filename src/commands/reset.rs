//! # Reset Command
//!
//! Drop every staged (uncommitted) operation, leaving the working
//! directory untouched.
//!
//! ## Usage
//!
//! ```bash
//! sit reset
//! ```

use anyhow::Result;

use crate::Repository;

/// Execute the reset command.
///
/// # Example
///
/// ```no_run
/// use sit::commands::reset::run;
///
/// run().unwrap();
/// ```
pub fn run() -> Result<()> {
    let repo = Repository::find()?;
    repo.reset()?;
    println!("dropped staged changes");
    Ok(())
}
