//! # Hasher
//!
//! Deterministic content and commit hashing. Text blobs are hashed with
//! the Git blob convention (`blob <len>\0<content>`) so they match
//! `git hash-object` for the same bytes; binary blobs are hashed over
//! their raw bytes directly — a deliberate divergence from Git, since
//! there is no equivalent "binary blob" convention to stay compatible
//! with.

use sha1::{Digest, Sha1};

/// A 40-character lowercase hex SHA-1 digest.
pub type Hash = String;

fn sha1_hex(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Hash of a text file's content, Git-blob-compatible.
pub fn blob_hash_text(content: &str) -> Hash {
    let header = format!("blob {}\0", content.len());
    sha1_hex(&[header.as_bytes(), content.as_bytes()])
}

/// Hash of a binary file's raw bytes.
pub fn blob_hash_binary(bytes: &[u8]) -> Hash {
    sha1_hex(&[bytes])
}

/// The hash `touch` assigns to a newly created empty text file.
pub fn empty_blob_hash() -> Hash {
    blob_hash_text("")
}

/// Derive a commit hash from its metadata and the exact bytes of the
/// operations it seals.
///
/// SHA-1 over the following lines joined by `\n`, in this exact order,
/// with optional lines included only when present:
///
/// 1. `author <author>`
/// 2. `timestamp <timestamp>`
/// 3. `message <message>` (always present, empty string allowed)
/// 4. `parent <parent>` (only if there is a parent)
/// 5. `<staged_ops_text>` (only if non-empty; the literal serialized
///    staged-operations block, no trailing newline)
pub fn commit_hash(
    author: &str,
    timestamp: &str,
    message: &str,
    parent: Option<&str>,
    staged_ops_text: Option<&str>,
) -> Hash {
    let mut lines = vec![format!("author {author}"), format!("timestamp {timestamp}"), format!("message {message}")];

    if let Some(parent) = parent {
        lines.push(format!("parent {parent}"));
    }

    if let Some(ops) = staged_ops_text {
        if !ops.is_empty() {
            lines.push(ops.to_string());
        }
    }

    let preamble = lines.join("\n");
    sha1_hex(&[preamble.as_bytes()])
}
