//! # Log Model
//!
//! The line-oriented, indentation-nested record grammar that the history
//! file is written in. This module knows nothing about operations,
//! commits, or patches — it only knows about `Record`s: a cue word, the
//! rest of the header line verbatim, and an optional indented body.
//!
//! ## Format
//!
//! ```text
//! cue field1 field2
//!  body line one
//!  body line two
//! ```
//!
//! A record starts in column 0. Every subsequent line that begins with
//! at least one space belongs to its body; exactly one leading space is
//! stripped per nesting level, so a record's body can itself be
//! re-parsed as a sequence of records one level deeper — this is how a
//! `stash` record's body (a block of staged operations) and a `patch`
//! record's body (a block of `delete`/`insert` lines) are represented
//! with the same machinery as everything else.

use crate::error::SitError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// One top-level entry in the history file: a cue word, the rest of its
/// header line, and an optional indented body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The first whitespace-delimited token on the header line.
    pub cue: String,
    /// Everything after the cue and its separating space (empty string
    /// if the header line is just the cue).
    pub rest: String,
    /// The de-indented body text, if the record has one. Interior
    /// newlines are preserved verbatim.
    pub body: Option<String>,
}

impl Record {
    /// A record with no body.
    pub fn new(cue: impl Into<String>, rest: impl Into<String>) -> Self {
        Self {
            cue: cue.into(),
            rest: rest.into(),
            body: None,
        }
    }

    /// A record with a body.
    pub fn with_body(cue: impl Into<String>, rest: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            cue: cue.into(),
            rest: rest.into(),
            body: Some(body.into()),
        }
    }

    /// The header line's fields, split on single spaces.
    pub fn fields(&self) -> Vec<&str> {
        if self.rest.is_empty() {
            Vec::new()
        } else {
            self.rest.split(' ').collect()
        }
    }

    /// Serialize this record to its exact textual form (no trailing
    /// newline — callers that concatenate records add one each).
    pub fn serialize(&self) -> String {
        let header = if self.rest.is_empty() {
            self.cue.clone()
        } else {
            format!("{} {}", self.cue, self.rest)
        };

        match &self.body {
            None => header,
            Some(body) => {
                let indented: Vec<String> = body.split('\n').map(|line| format!(" {line}")).collect();
                format!("{header}\n{}", indented.join("\n"))
            }
        }
    }
}

/// Split `text` into raw lines, dropping a single trailing empty line
/// produced by a final `\n` (so a file ending in a newline doesn't
/// produce a spurious blank top-level line).
fn raw_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Parse a block of text into records. Tolerates blank lines between
/// records; rejects a body line appearing before any record has been
/// opened.
pub fn parse_records(text: &str) -> Result<Vec<Record>, SitError> {
    let lines = raw_lines(text);
    let mut records = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.is_empty() {
            i += 1;
            continue;
        }

        if line.starts_with(' ') {
            return Err(SitError::MalformedRecord {
                detail: format!("body line with no owning record: {line:?}"),
            });
        }

        let (cue, rest) = match line.split_once(' ') {
            Some((cue, rest)) => (cue.to_string(), rest.to_string()),
            None => (line.to_string(), String::new()),
        };
        i += 1;

        let mut body_lines = Vec::new();
        while i < lines.len() && lines[i].starts_with(' ') {
            body_lines.push(&lines[i][1..]);
            i += 1;
        }

        let body = if body_lines.is_empty() {
            None
        } else {
            Some(body_lines.join("\n"))
        };

        records.push(Record { cue, rest, body });
    }

    Ok(records)
}

/// Serialize a sequence of records into the text of a history file (or
/// a nested body block), one record per line-group, each terminated by
/// a newline.
pub fn serialize_records(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.serialize());
        out.push('\n');
    }
    out
}

/// Append a single record to the history file at `path`, atomically:
/// serialize fully in memory, write in one call, then fsync.
pub fn append_record(path: &Path, record: &Record) -> Result<(), SitError> {
    append_text(path, &format!("{}\n", record.serialize()))
}

/// Append a sequence of records in one atomic write.
pub fn append_records(path: &Path, records: &[Record]) -> Result<(), SitError> {
    if records.is_empty() {
        return Ok(());
    }
    append_text(path, &serialize_records(records))
}

fn append_text(path: &Path, text: &str) -> Result<(), SitError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.sync_data()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_simple_record() {
        let record = Record::new("touch", "a/b.txt");
        assert_eq!(record.serialize(), "touch a/b.txt");

        let parsed = parse_records(&record.serialize()).unwrap();
        assert_eq!(parsed, vec![record]);
    }

    #[test]
    fn test_round_trip_body_record() {
        let record = Record::with_body("write", "a.txt deadbeef", "line one\nline two\n");
        let text = format!("{}\n", record.serialize());
        assert_eq!(text, "write a.txt deadbeef\n line one\n line two\n \n");

        let parsed = parse_records(&text).unwrap();
        assert_eq!(parsed, vec![record]);
    }

    #[test]
    fn test_round_trip_nested_body() {
        // a stash body is itself a block of records, one indent level in
        let inner = Record::new("touch", "x.txt");
        let outer = Record::with_body("stash", "", serialize_records(&[inner.clone()]).trim_end_matches('\n'));

        let outer_text = format!("{}\n", outer.serialize());
        let parsed_outer = parse_records(&outer_text).unwrap();
        assert_eq!(parsed_outer.len(), 1);

        let reparsed_inner = parse_records(parsed_outer[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(reparsed_inner, vec![inner]);
    }

    #[test]
    fn test_blank_lines_tolerated() {
        let text = "touch a.txt\n\ntouch b.txt\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_body_line_without_owner_is_malformed() {
        let err = parse_records(" orphaned body line\n").unwrap_err();
        assert!(matches!(err, SitError::MalformedRecord { .. }));
    }

    #[test]
    fn test_append_and_reparse_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("history.sit");

        append_record(&path, &Record::new("commit", "")).unwrap();
        append_record(&path, &Record::new("touch", "a.txt")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let records = parse_records(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cue, "commit");
        assert_eq!(records[1].cue, "touch");
    }
}
