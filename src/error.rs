//! # Error Kinds
//!
//! The fixed vocabulary of failures spec out in the design: every one of
//! these is a condition a caller (the CLI, or a test) needs to match on,
//! not just display. I/O failures are wrapped rather than flattened to
//! string, so `?` keeps working throughout the crate.

use thiserror::Error;

/// Errors surfaced by the Sit library.
#[derive(Debug, Error)]
pub enum SitError {
    /// No `<dirname>.sit` file was found in the current directory or any
    /// of its ancestors.
    #[error("not a sit repository (or any of the parent directories)")]
    NotARepository,

    /// `init` refused to overwrite an existing history file.
    #[error("a sit repository already exists here")]
    AlreadyARepository,

    /// `commit` was called with nothing staged.
    #[error("no staged changes to commit")]
    EmptyStage,

    /// `checkout` was refused because the working directory has unstaged
    /// changes.
    #[error("working tree has unstaged changes, refusing to checkout")]
    DirtyWorkingTree,

    /// `find_commit` matched no commit for the given query.
    #[error("no commit matching '{query}'")]
    UnknownTarget { query: String },

    /// The log parser rejected the history file, or a fold step hit an
    /// operation it cannot apply (rename of a missing path, patch on a
    /// missing file, delete of an absent path).
    #[error("malformed history file: {detail}")]
    MalformedRecord { detail: String },

    /// Any underlying filesystem failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
