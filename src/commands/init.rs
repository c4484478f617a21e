//! # Init Command
//!
//! Initialize a new Sit repository.
//!
//! ## What it does
//!
//! Creates `<dirname>.sit`, a single plain-text history file holding one
//! initial commit that seals zero operations. There is no object
//! database and no index file — the history file is the whole
//! repository.
//!
//! ## Usage
//!
//! ```bash
//! # Initialize in current directory
//! sit init
//!
//! # Initialize in a specific directory
//! sit init /path/to/repo
//! ```

use std::path::Path;
use anyhow::Result;
use crate::Repository;

/// Execute the init command.
///
/// # Arguments
///
/// * `path` - Optional path where to initialize. Defaults to current directory.
///
/// # Example
///
/// ```no_run
/// use sit::commands::init::run;
///
/// run(None).expect("failed to initialize repository");
/// ```
pub fn run(path: Option<&Path>) -> Result<()> {
    let target = path.unwrap_or(Path::new("."));
    let repo = Repository::init(target)?;
    println!("initialized sit repository at {}", repo.history_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_command() {
        let temp = tempdir().unwrap();
        run(Some(temp.path())).unwrap();

        let repo = Repository::find_from(temp.path()).unwrap();
        assert!(repo.history_path.exists());
    }

    /// `sit init` with no path argument (the default, overwhelmingly
    /// common invocation) must name the history file after the actual
    /// current directory, not a generic fallback.
    #[test]
    fn test_init_with_no_path_names_file_after_current_dir() {
        let temp = tempdir().unwrap();
        let canonical = std::fs::canonicalize(temp.path()).unwrap();
        let project_dir = canonical.join("my-project");
        std::fs::create_dir_all(&project_dir).unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&project_dir).unwrap();
        let result = run(None);
        std::env::set_current_dir(&original_dir).unwrap();
        result.unwrap();

        let repo = Repository::find_from(&project_dir).unwrap();
        assert_eq!(repo.history_path.file_name().unwrap().to_str().unwrap(), "my-project.sit");
    }
}
