//! # Log Command
//!
//! Display the commit chain, newest first, by reading every `commit`
//! record straight out of the history file and reversing it — there is
//! no ref to follow, since the history file is the whole chain.
//!
//! ## Usage
//!
//! ```bash
//! # Show commit log
//! sit log
//!
//! # One-line format
//! sit log --oneline
//! ```

use anyhow::Result;

use crate::operation::CommitRecord;
use crate::Repository;

fn format_commit(commit: &CommitRecord, oneline: bool) -> String {
    let short_id = &commit.id[..7.min(commit.id.len())];

    if oneline {
        let message = commit.message.as_deref().unwrap_or("");
        format!("{short_id} {message}")
    } else {
        let mut lines = vec![format!("commit {}", commit.id), format!("Author: {}", commit.author), format!("Date:   {}", commit.timestamp)];
        if let Some(message) = &commit.message {
            lines.push(String::new());
            for line in message.lines() {
                lines.push(format!("    {line}"));
            }
        }
        lines.join("\n")
    }
}

/// Execute the log command.
///
/// # Example
///
/// ```no_run
/// use sit::commands::log::run;
///
/// run(false).unwrap();
/// ```
pub fn run(oneline: bool) -> Result<()> {
    let repo = Repository::find()?;
    let commits = all_commits(&repo)?;

    for commit in commits.iter().rev() {
        println!("{}", format_commit(commit, oneline));
        if !oneline {
            println!();
        }
    }

    Ok(())
}

fn all_commits(repo: &Repository) -> Result<Vec<CommitRecord>> {
    let text = std::fs::read_to_string(&repo.history_path)?;
    let records = crate::log::parse_records(&text)?;

    let commits = records
        .iter()
        .filter(|record| record.cue == "commit")
        .map(CommitRecord::from_record)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(commits)
}
