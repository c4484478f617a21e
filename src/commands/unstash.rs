//! # Unstash Command
//!
//! Restore the most recently stashed operations back onto the stage.
//!
//! ## Usage
//!
//! ```bash
//! sit unstash
//! ```

use anyhow::Result;

use crate::Repository;

/// Execute the unstash command.
///
/// # Example
///
/// ```no_run
/// use sit::commands::unstash::run;
///
/// run().unwrap();
/// ```
pub fn run() -> Result<()> {
    let repo = Repository::find()?;
    repo.unstash()?;
    println!("restored stashed changes");
    Ok(())
}
