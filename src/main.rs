//! # Sit CLI
//!
//! Thin command dispatcher over the `sit` library. Every subcommand is a
//! one-line call into `sit::commands::*` — all the actual logic lives in
//! the library so it stays testable without going through argument
//! parsing.

use clap::{Parser, Subcommand};
use anyhow::Result;

use sit::commands;

/// Sit - a history-file version-control system
///
/// Keeps a project's entire history as a single append-only plain-text
/// file instead of an object database.
#[derive(Parser)]
#[command(name = "sit")]
#[command(version = "0.1.0")]
#[command(about = "A history-file version-control system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new sit repository
    ///
    /// Creates `<dirname>.sit`: a single history file holding an initial
    /// commit that seals zero operations.
    Init {
        /// Directory to initialize. Defaults to the current directory.
        path: Option<String>,
    },

    /// Stage the working directory's changes
    ///
    /// With no paths, diffs the whole working directory against the
    /// staged tree. With paths given, scans and diffs only those paths —
    /// a file not named is never staged as deleted.
    Add {
        /// Paths to stage. Defaults to the whole working directory.
        paths: Vec<String>,
    },

    /// Show the working tree status
    ///
    /// Staged operations (committed tree vs staged tree) and unstaged
    /// operations (staged tree vs working directory).
    Status,

    /// Seal the staged operations into a new commit
    Commit {
        /// The commit message
        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// Drop the staged (uncommitted) operations
    Reset,

    /// Park the currently staged operations for later
    Stash,

    /// Restore the most recently stashed operations
    Unstash,

    /// Materialize a past commit's tree onto the working directory
    Checkout {
        /// Commit order number or hash prefix; defaults to fast-forwarding
        /// the working directory to the currently staged tree
        query: Option<String>,
    },

    /// List the paths in a tree
    Ls {
        /// Commit order number or hash prefix; defaults to the staged tree
        query: Option<String>,
    },

    /// Show the commit chain
    Log {
        /// Show one commit per line
        #[arg(long = "oneline")]
        oneline: bool,
    },

    /// Show the operations between the committed tree and another tree
    Diff {
        /// Compare against the staged tree instead of the working directory
        #[arg(long)]
        staged: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_env("SIT_LOG").unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            commands::init::run(path.as_deref().map(std::path::Path::new))?;
        }
        Commands::Add { paths } => {
            commands::add::run(paths)?;
        }
        Commands::Status => {
            commands::status::run()?;
        }
        Commands::Commit { message } => {
            commands::commit::run(message)?;
        }
        Commands::Reset => {
            commands::reset::run()?;
        }
        Commands::Stash => {
            commands::stash::run()?;
        }
        Commands::Unstash => {
            commands::unstash::run()?;
        }
        Commands::Checkout { query } => {
            commands::checkout::run(query.as_deref())?;
        }
        Commands::Ls { query } => {
            commands::ls::run(query.as_deref())?;
        }
        Commands::Log { oneline } => {
            commands::log::run(*oneline)?;
        }
        Commands::Diff { staged } => {
            commands::diff::run(*staged)?;
        }
    }

    Ok(())
}
