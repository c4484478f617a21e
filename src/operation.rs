//! # Operation grammar
//!
//! Binds the generic [`crate::log::Record`] grammar to the domain
//! vocabulary spec'd out for the history file: the seven operation cues,
//! the `commit` record, and the `stash` record. Implemented as a tagged
//! sum — the Tree Folder becomes a simple match-per-variant, and adding
//! a new cue here is purely additive.

use crate::error::SitError;
use crate::hash::Hash;
use crate::log::{self, Record};

/// One change to the virtual filesystem tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create an empty file.
    Touch { path: String },
    /// Create or replace a text file.
    Write { path: String, hash: Hash, content: String },
    /// Create or replace a binary file.
    Binary { path: String, hash: Hash, size: u64, content_base64: String },
    /// Remove a path.
    Delete { path: String },
    /// Create a directory.
    Mkdir { path: String },
    /// Move a path.
    Rename { from: String, to: String },
    /// Apply a patch script to an existing text file.
    Patch { path: String, hash: Hash, script: String },
}

impl Operation {
    /// Convert to the generic record form for serialization/appending.
    pub fn to_record(&self) -> Record {
        match self {
            Operation::Touch { path } => Record::new("touch", path.clone()),
            Operation::Write { path, hash, content } => {
                Record::with_body("write", format!("{path} {hash}"), content.clone())
            }
            Operation::Binary { path, hash, size, content_base64 } => {
                Record::with_body("binary", format!("{path} {hash} {size}"), content_base64.clone())
            }
            Operation::Delete { path } => Record::new("delete", path.clone()),
            Operation::Mkdir { path } => Record::new("mkdir", path.clone()),
            Operation::Rename { from, to } => Record::new("rename", format!("{from} {to}")),
            Operation::Patch { path, hash, script } => {
                Record::with_body("patch", format!("{path} {hash}"), script.clone())
            }
        }
    }

    /// Parse an operation from a generic record, or `None` if the cue
    /// is not an operation cue (e.g. `commit` or `stash`).
    pub fn from_record(record: &Record) -> Result<Option<Self>, SitError> {
        let fields = record.fields();

        let malformed = |detail: String| SitError::MalformedRecord { detail };

        let op = match record.cue.as_str() {
            "touch" => Operation::Touch { path: single_field(&fields, "touch")?.to_string() },
            "write" => {
                let (path, hash) = two_fields(&fields, "write")?;
                let content = record.body.clone().ok_or_else(|| malformed("write record missing body".into()))?;
                Operation::Write { path: path.to_string(), hash: hash.to_string(), content }
            }
            "binary" => {
                let (path, hash, size) = three_fields(&fields, "binary")?;
                let size: u64 = size
                    .parse()
                    .map_err(|_| malformed(format!("binary record has non-numeric size: {size}")))?;
                let content_base64 =
                    record.body.clone().ok_or_else(|| malformed("binary record missing body".into()))?;
                Operation::Binary { path: path.to_string(), hash: hash.to_string(), size, content_base64 }
            }
            "delete" => Operation::Delete { path: single_field(&fields, "delete")?.to_string() },
            "mkdir" => Operation::Mkdir { path: single_field(&fields, "mkdir")?.to_string() },
            "rename" => {
                let (from, to) = two_fields(&fields, "rename")?;
                Operation::Rename { from: from.to_string(), to: to.to_string() }
            }
            "patch" => {
                let (path, hash) = two_fields(&fields, "patch")?;
                let script = record.body.clone().ok_or_else(|| malformed("patch record missing body".into()))?;
                Operation::Patch { path: path.to_string(), hash: hash.to_string(), script }
            }
            _ => return Ok(None),
        };

        Ok(Some(op))
    }

    /// The path this operation primarily concerns (`rename`'s destination).
    pub fn primary_path(&self) -> &str {
        match self {
            Operation::Touch { path }
            | Operation::Write { path, .. }
            | Operation::Binary { path, .. }
            | Operation::Delete { path }
            | Operation::Mkdir { path }
            | Operation::Patch { path, .. } => path,
            Operation::Rename { to, .. } => to,
        }
    }
}

fn single_field<'a>(fields: &[&'a str], cue: &str) -> Result<&'a str, SitError> {
    match fields {
        [path] => Ok(path),
        _ => Err(SitError::MalformedRecord { detail: format!("{cue} expects exactly one field") }),
    }
}

fn two_fields<'a>(fields: &[&'a str], cue: &str) -> Result<(&'a str, &'a str), SitError> {
    match fields {
        [a, b] => Ok((a, b)),
        _ => Err(SitError::MalformedRecord { detail: format!("{cue} expects exactly two fields") }),
    }
}

fn three_fields<'a>(fields: &[&'a str], cue: &str) -> Result<(&'a str, &'a str, &'a str), SitError> {
    match fields {
        [a, b, c] => Ok((a, b, c)),
        _ => Err(SitError::MalformedRecord { detail: format!("{cue} expects exactly three fields") }),
    }
}

/// A commit record: author/timestamp/order metadata plus its hash and
/// hash-chain link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub author: String,
    pub timestamp: String,
    pub order: u64,
    pub id: Hash,
    pub parent: Option<Hash>,
    pub message: Option<String>,
}

impl CommitRecord {
    pub fn to_record(&self) -> Record {
        let mut lines = vec![
            format!("author {}", self.author),
            format!("timestamp {}", self.timestamp),
            format!("order {}", self.order),
        ];
        if let Some(message) = &self.message {
            lines.push(format!("message {message}"));
        }
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("id {}", self.id));

        Record::with_body("commit", "", lines.join("\n"))
    }

    pub fn from_record(record: &Record) -> Result<Self, SitError> {
        if record.cue != "commit" {
            return Err(SitError::MalformedRecord { detail: format!("expected commit record, got {}", record.cue) });
        }

        let body = record.body.as_deref().ok_or_else(|| SitError::MalformedRecord {
            detail: "commit record missing body".into(),
        })?;

        let mut author = None;
        let mut timestamp = None;
        let mut order = None;
        let mut id = None;
        let mut parent = None;
        let mut message = None;

        for line in body.split('\n') {
            let (field, value) = line.split_once(' ').unwrap_or((line, ""));
            match field {
                "author" => author = Some(value.to_string()),
                "timestamp" => timestamp = Some(value.to_string()),
                "order" => {
                    order = Some(value.parse::<u64>().map_err(|_| SitError::MalformedRecord {
                        detail: format!("commit has non-numeric order: {value}"),
                    })?)
                }
                "id" => id = Some(value.to_string()),
                "parent" => parent = Some(value.to_string()),
                "message" => message = Some(value.to_string()),
                other => {
                    return Err(SitError::MalformedRecord {
                        detail: format!("unknown commit field: {other}"),
                    })
                }
            }
        }

        let missing = |field: &str| SitError::MalformedRecord { detail: format!("commit missing {field} field") };

        Ok(CommitRecord {
            author: author.ok_or_else(|| missing("author"))?,
            timestamp: timestamp.ok_or_else(|| missing("timestamp"))?,
            order: order.ok_or_else(|| missing("order"))?,
            id: id.ok_or_else(|| missing("id"))?,
            parent,
            message,
        })
    }
}

/// A `stash` record: the staged operations that were parked by `stash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashRecord {
    pub operations: Vec<Operation>,
}

impl StashRecord {
    pub fn to_record(&self) -> Record {
        let records: Vec<Record> = self.operations.iter().map(Operation::to_record).collect();
        let body = log::serialize_records(&records).trim_end_matches('\n').to_string();
        Record::with_body("stash", "", body)
    }

    pub fn from_record(record: &Record) -> Result<Self, SitError> {
        if record.cue != "stash" {
            return Err(SitError::MalformedRecord { detail: format!("expected stash record, got {}", record.cue) });
        }

        let operations = match &record.body {
            None => Vec::new(),
            Some(body) => {
                let inner_records = log::parse_records(body)?;
                let mut operations = Vec::with_capacity(inner_records.len());
                for inner in &inner_records {
                    match Operation::from_record(inner)? {
                        Some(op) => operations.push(op),
                        None => {
                            return Err(SitError::MalformedRecord {
                                detail: format!("non-operation cue inside stash: {}", inner.cue),
                            })
                        }
                    }
                }
                operations
            }
        };

        Ok(StashRecord { operations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_record_roundtrip() {
        let ops = vec![
            Operation::Touch { path: "a.txt".into() },
            Operation::Write { path: "b.txt".into(), hash: "a".repeat(40), content: "hello\nworld\n".into() },
            Operation::Binary {
                path: "img.png".into(),
                hash: "b".repeat(40),
                size: 4,
                content_base64: "AAECAw==".into(),
            },
            Operation::Delete { path: "c.txt".into() },
            Operation::Mkdir { path: "dir".into() },
            Operation::Rename { from: "old.txt".into(), to: "new.txt".into() },
            Operation::Patch { path: "d.txt".into(), hash: "c".repeat(40), script: "delete 0 1".into() },
        ];

        for op in &ops {
            let record = op.to_record();
            let parsed = Operation::from_record(&record).unwrap().unwrap();
            assert_eq!(&parsed, op);
        }
    }

    #[test]
    fn test_commit_record_roundtrip() {
        let commit = CommitRecord {
            author: "Ada Lovelace".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            order: 1,
            id: "f".repeat(40),
            parent: Some("e".repeat(40)),
            message: Some("Initial commit".into()),
        };

        let record = commit.to_record();
        let parsed = CommitRecord::from_record(&record).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn test_commit_record_without_parent_or_message() {
        let commit = CommitRecord {
            author: "Ada".into(),
            timestamp: "ts".into(),
            order: 1,
            id: "a".repeat(40),
            parent: None,
            message: None,
        };

        let text = commit.to_record().serialize();
        assert!(!text.contains("parent"));
        assert!(!text.contains("message"));

        let parsed = CommitRecord::from_record(&commit.to_record()).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn test_stash_record_roundtrip() {
        let stash = StashRecord {
            operations: vec![
                Operation::Touch { path: "a.txt".into() },
                Operation::Write { path: "b.txt".into(), hash: "a".repeat(40), content: "hi".into() },
            ],
        };

        let record = stash.to_record();
        let parsed = StashRecord::from_record(&record).unwrap();
        assert_eq!(parsed, stash);
    }
}
