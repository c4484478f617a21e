//! # Patch Codec
//!
//! Patches describe edits to a text file as a sequence of position-
//! indexed operations over the *pre-patch* character stream: `delete
//! <pos> <len>` and `insert <pos> <text>`.
//!
//! The diff is computed character-by-character with `similar`'s Myers
//! implementation (the teacher has no text-diff dependency of its own;
//! `similar` is pulled in from this pack's broader Rust-VCS corpus for
//! this purpose). The cursor bookkeeping that turns a diff into
//! positions is the part that matters for correctness and is spelled
//! out in full below.

use crate::log::{self, Record};
use crate::error::SitError;
use similar::{capture_diff_slices, Algorithm, DiffOp};

/// One step of a patch script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Remove `len` characters starting at absolute offset `pos`.
    Delete { pos: usize, len: usize },
    /// Insert `text` at offset `pos`.
    Insert { pos: usize, text: String },
}

/// Compute the patch script transforming `old` into `new`.
///
/// The cursor `pos` advances by the length of an equal run and by the
/// length of inserted text, but does *not* advance on a deletion —
/// because a deletion and the insertion that (often) follows it occupy
/// the same slot in the string as it is rewritten left to right, and
/// everything downstream is positioned relative to that evolving
/// string, not to fixed offsets in `old`.
pub fn diff_text(old: &str, new: &str) -> Vec<PatchOp> {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let diff_ops = capture_diff_slices(Algorithm::Myers, &old_chars, &new_chars);

    let mut pos: usize = 0;
    let mut ops = Vec::new();

    for op in diff_ops {
        match op {
            DiffOp::Equal { len, .. } => {
                pos += len;
            }
            DiffOp::Delete { old_len, .. } => {
                ops.push(PatchOp::Delete { pos, len: old_len });
            }
            DiffOp::Insert { new_index, new_len, .. } => {
                let text: String = new_chars[new_index..new_index + new_len].iter().collect();
                let op_pos = pos;
                pos += new_len;
                ops.push(PatchOp::Insert { pos: op_pos, text });
            }
            DiffOp::Replace { old_len, new_index, new_len, .. } => {
                ops.push(PatchOp::Delete { pos, len: old_len });
                let text: String = new_chars[new_index..new_index + new_len].iter().collect();
                ops.push(PatchOp::Insert { pos, text });
                pos += new_len;
            }
        }
    }

    ops
}

/// Apply a patch script to `old`, producing the post-patch text.
///
/// Operations are applied strictly in order, each one splicing into the
/// result of the previous one.
pub fn apply_patch(old: &str, ops: &[PatchOp]) -> Result<String, SitError> {
    let mut chars: Vec<char> = old.chars().collect();

    for op in ops {
        match op {
            PatchOp::Delete { pos, len } => {
                let end = pos + len;
                if *pos > chars.len() || end > chars.len() {
                    return Err(SitError::MalformedRecord {
                        detail: format!("patch delete out of range: pos={pos} len={len} text_len={}", chars.len()),
                    });
                }
                chars.drain(*pos..end);
            }
            PatchOp::Insert { pos, text } => {
                if *pos > chars.len() {
                    return Err(SitError::MalformedRecord {
                        detail: format!("patch insert out of range: pos={pos} text_len={}", chars.len()),
                    });
                }
                let insertion: Vec<char> = text.chars().collect();
                chars.splice(*pos..*pos, insertion);
            }
        }
    }

    Ok(chars.into_iter().collect())
}

/// Whether a `patch` record should be emitted rather than a full
/// `write`: `old` is non-empty and the changed-character mass is below
/// the configured threshold of `old`'s length.
pub fn should_use_patch(old: &str, ops: &[PatchOp], threshold_ratio: f64) -> bool {
    if old.is_empty() {
        return false;
    }

    let changed: usize = ops
        .iter()
        .map(|op| match op {
            PatchOp::Delete { len, .. } => *len,
            PatchOp::Insert { text, .. } => text.chars().count(),
        })
        .sum();

    (changed as f64) < threshold_ratio * (old.chars().count() as f64)
}

/// Serialize a patch script into the body text of a `patch` operation
/// record (itself a block of `delete`/`insert` records, one nesting
/// level deeper).
pub fn serialize_ops(ops: &[PatchOp]) -> String {
    let records: Vec<Record> = ops
        .iter()
        .map(|op| match op {
            PatchOp::Delete { pos, len } => Record::new("delete", format!("{pos} {len}")),
            PatchOp::Insert { pos, text } if text.contains('\n') => {
                Record::with_body("insert", pos.to_string(), text.clone())
            }
            PatchOp::Insert { pos, text } => Record::new("insert", format!("{pos} {text}")),
        })
        .collect();

    log::serialize_records(&records).trim_end_matches('\n').to_string()
}

/// Parse a patch script back out of the de-indented body text of a
/// `patch` operation record.
pub fn parse_ops(body: &str) -> Result<Vec<PatchOp>, SitError> {
    let records = log::parse_records(body)?;
    records
        .into_iter()
        .map(|record| match record.cue.as_str() {
            "delete" => {
                let fields = record.fields();
                let (pos, len) = match fields.as_slice() {
                    [pos, len] => (pos, len),
                    _ => {
                        return Err(SitError::MalformedRecord {
                            detail: format!("malformed delete patch-op: {:?}", record.rest),
                        })
                    }
                };
                let pos = pos.parse().map_err(|_| SitError::MalformedRecord {
                    detail: format!("non-numeric delete position: {pos}"),
                })?;
                let len = len.parse().map_err(|_| SitError::MalformedRecord {
                    detail: format!("non-numeric delete length: {len}"),
                })?;
                Ok(PatchOp::Delete { pos, len })
            }
            "insert" => {
                let (pos_str, text) = match &record.body {
                    Some(body) => (record.rest.trim(), body.clone()),
                    None => match record.rest.split_once(' ') {
                        Some((pos, text)) => (pos, text.to_string()),
                        None => (record.rest.as_str(), String::new()),
                    },
                };
                let pos = pos_str.parse().map_err(|_| SitError::MalformedRecord {
                    detail: format!("non-numeric insert position: {pos_str}"),
                })?;
                Ok(PatchOp::Insert { pos, text })
            }
            other => Err(SitError::MalformedRecord {
                detail: format!("unknown patch-op cue: {other}"),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_law_roundtrip() {
        let cases = [
            ("abc", "axc"),
            ("abcdef", "adef"),
            ("ac", "abc"),
            ("hello world", "hello there world"),
            ("", "fresh content"),
            ("stays the same", "stays the same"),
            ("one\ntwo\nthree\n", "one\nTWO\nthree\nfour\n"),
        ];

        for (old, new) in cases {
            let ops = diff_text(old, new);
            let applied = apply_patch(old, &ops).unwrap();
            assert_eq!(applied, new, "roundtrip failed for {old:?} -> {new:?}");
        }
    }

    #[test]
    fn test_serialize_parse_roundtrip() {
        let ops = diff_text("the quick brown fox", "the slow brown fox jumps");
        let body = serialize_ops(&ops);
        let parsed = parse_ops(&body).unwrap();
        assert_eq!(parsed, ops);
    }

    #[test]
    fn test_multiline_insert_uses_body_form() {
        let ops = vec![PatchOp::Insert { pos: 3, text: "a\nb\nc".to_string() }];
        let body = serialize_ops(&ops);
        assert!(body.contains('\n'));
        let parsed = parse_ops(&body).unwrap();
        assert_eq!(parsed, ops);
    }

    #[test]
    fn test_should_use_patch_threshold() {
        let old = "x".repeat(1000);
        let mut new = old.clone();
        new.replace_range(0..100, &"y".repeat(100));

        let ops = diff_text(&old, &new);
        assert!(should_use_patch(&old, &ops, 0.5));
    }

    #[test]
    fn test_should_use_patch_rejects_empty_old() {
        let ops = diff_text("", "new content");
        assert!(!should_use_patch("", &ops, 0.5));
    }

    #[test]
    fn test_should_use_patch_rejects_large_changes() {
        let old = "x".repeat(10);
        let new = "y".repeat(10);
        let ops = diff_text(&old, &new);
        assert!(!should_use_patch(&old, &ops, 0.5));
    }

    #[test]
    fn test_apply_patch_rejects_out_of_range() {
        let err = apply_patch("abc", &[PatchOp::Delete { pos: 10, len: 1 }]).unwrap_err();
        assert!(matches!(err, SitError::MalformedRecord { .. }));
    }
}
