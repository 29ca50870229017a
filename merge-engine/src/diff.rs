//! Line-level diffing.
//!
//! Alignment is delegated to the `similar` crate (Myers algorithm); this
//! module flattens its grouped operations into a per-line edit script and
//! renders unified diffs for display.

use similar::{Algorithm, DiffOp, TextDiff, capture_diff_slices};

use crate::types::{Edit, EditOp};

/// Split text into lines on `\n`.
///
/// Joining the result with `\n` reproduces the input exactly, so a trailing
/// newline shows up as a final empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Compute the edit script that turns `a` into `b`.
///
/// Unchanged lines produce no edits. A modified region is a run of deletes
/// followed by the inserts that replace it. Identical inputs always give an
/// empty script.
pub fn diff_lines<S: AsRef<str>>(a: &[S], b: &[S]) -> Vec<Edit> {
    let old: Vec<&str> = a.iter().map(AsRef::as_ref).collect();
    let new: Vec<&str> = b.iter().map(AsRef::as_ref).collect();

    let mut edits = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index,
                old_len,
                new_index,
            } => {
                for i in old_index..old_index + old_len {
                    edits.push(Edit::delete(i, new_index));
                }
            }
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => {
                for j in new_index..new_index + new_len {
                    edits.push(Edit::insert(old_index, j, new[j]));
                }
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                for i in old_index..old_index + old_len {
                    edits.push(Edit::delete(i, new_index));
                }
                for j in new_index..new_index + new_len {
                    edits.push(Edit::insert(old_index + old_len, j, new[j]));
                }
            }
        }
    }
    edits
}

/// A contiguous change against the old sequence: `old_start..old_end` is
/// replaced by `lines`. Pure insertions have `old_start == old_end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hunk {
    pub old_start: usize,
    pub old_end: usize,
    pub lines: Vec<String>,
}

/// Group an edit script into hunks, ordered by position.
pub(crate) fn hunks(edits: &[Edit]) -> Vec<Hunk> {
    let mut out: Vec<Hunk> = Vec::new();
    for edit in edits {
        let extends = out.last().is_some_and(|h| h.old_end == edit.old_line);
        match (edit.op, extends) {
            (EditOp::Delete, true) => {
                if let Some(h) = out.last_mut() {
                    h.old_end += 1;
                }
            }
            (EditOp::Insert, true) => {
                if let Some(h) = out.last_mut() {
                    h.lines.push(edit.new_text.clone());
                }
            }
            (EditOp::Delete, false) => out.push(Hunk {
                old_start: edit.old_line,
                old_end: edit.old_line + 1,
                lines: Vec::new(),
            }),
            (EditOp::Insert, false) => out.push(Hunk {
                old_start: edit.old_line,
                old_end: edit.old_line,
                lines: vec![edit.new_text.clone()],
            }),
        }
    }
    out
}

/// Apply an edit script produced by [`diff_lines`] to `a`.
pub fn apply_edits<S: AsRef<str>>(a: &[S], edits: &[Edit]) -> Vec<String> {
    let mut out = Vec::with_capacity(a.len());
    let mut cursor = 0;
    for edit in edits {
        while cursor < edit.old_line && cursor < a.len() {
            out.push(a[cursor].as_ref().to_string());
            cursor += 1;
        }
        match edit.op {
            EditOp::Delete => cursor = edit.old_line + 1,
            EditOp::Insert => out.push(edit.new_text.clone()),
        }
    }
    out.extend(a[cursor.min(a.len())..].iter().map(|l| l.as_ref().to_string()));
    out
}

/// Render a unified diff between two versions of `path`.
///
/// Returns an empty string when the inputs are identical.
pub fn unified_diff(path: &str, base: &str, current: &str) -> String {
    if base == current {
        return String::new();
    }
    TextDiff::from_lines(base, current)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

/// Count (added, removed) lines between two texts.
pub fn line_stats(old: &str, new: &str) -> (usize, usize) {
    let edits = diff_lines(&split_lines(old), &split_lines(new));
    edits.iter().fold((0, 0), |(added, removed), e| match e.op {
        EditOp::Insert => (added + 1, removed),
        EditOp::Delete => (added, removed + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &str) -> Vec<&str> {
        split_lines(s)
    }

    #[test]
    fn test_identical_inputs_have_empty_script() {
        let a = lines("one\ntwo\nthree\n");
        assert!(diff_lines(&a, &a).is_empty());
        let empty: Vec<&str> = Vec::new();
        assert!(diff_lines(&empty, &empty).is_empty());
    }

    #[test]
    fn test_modified_line_is_delete_then_insert() {
        let edits = diff_lines(&lines("A\nB\nC"), &lines("A\nX\nC"));
        assert_eq!(
            edits,
            vec![Edit::delete(1, 1), Edit::insert(2, 1, "X")]
        );
    }

    #[test]
    fn test_pure_insert_and_delete_runs() {
        let added = diff_lines(&lines("A\nC"), &lines("A\nB1\nB2\nC"));
        assert!(added.iter().all(|e| e.op == EditOp::Insert));
        assert_eq!(added.len(), 2);

        let removed = diff_lines(&lines("A\nB1\nB2\nC"), &lines("A\nC"));
        assert!(removed.iter().all(|e| e.op == EditOp::Delete));
        assert_eq!(removed.len(), 2);
    }

    #[test]
    fn test_apply_reproduces_target() {
        let cases = [
            ("", "a\nb"),
            ("a\nb", ""),
            ("a\nb\nc\nd", "a\nc\nd\ne"),
            ("x\ny\nz\n", "w\nx\nq\nz\n"),
            ("1\n2\n3\n4\n5", "5\n4\n3\n2\n1"),
            ("same\nsame\nsame", "same\nother\nsame\nsame"),
        ];
        for (a, b) in cases {
            let (a, b) = (lines(a), lines(b));
            let edits = diff_lines(&a, &b);
            assert_eq!(apply_edits(&a, &edits), b, "a={a:?} b={b:?}");
        }
    }

    #[test]
    fn test_hunks_group_replacements() {
        let edits = diff_lines(&lines("A\nB\nC\nD"), &lines("A\nX\nY\nD\nE"));
        let hs = hunks(&edits);
        assert_eq!(
            hs,
            vec![
                Hunk {
                    old_start: 1,
                    old_end: 3,
                    lines: vec!["X".into(), "Y".into()],
                },
                Hunk {
                    old_start: 4,
                    old_end: 4,
                    lines: vec!["E".into()],
                },
            ]
        );
    }

    #[test]
    fn test_unified_diff_headers() {
        assert_eq!(unified_diff("f.txt", "a\n", "a\n"), "");
        let out = unified_diff("f.txt", "a\nb\n", "a\nc\n");
        assert!(out.starts_with("--- a/f.txt\n+++ b/f.txt\n"));
        assert!(out.contains("-b\n"));
        assert!(out.contains("+c\n"));
    }

    #[test]
    fn test_line_stats() {
        assert_eq!(line_stats("a\nb\nc", "a\nB\nc\nd"), (2, 1));
        assert_eq!(line_stats("a", "a"), (0, 0));
    }
}
