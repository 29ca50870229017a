//! Git-style conflict markers and `.conflict` side files.
//!
//! A marker block looks like:
//!
//! ```text
//! <<<<<<< current
//! user's text
//! =======
//! template's text
//! >>>>>>> updated
//! ```
//!
//! A conflict that knows where its kept text sits in the merged content
//! (`output_lines`) replaces exactly those lines. One that only has base line
//! numbers is inserted before that line, clamped to the end, and no content
//! is removed. Conflicts with no line at all (structured and section merges)
//! are appended at the end.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MergeError;
use crate::types::Conflict;

pub const CURRENT_MARKER: &str = "<<<<<<< current";
pub const SEPARATOR: &str = "=======";
pub const UPDATED_MARKER: &str = ">>>>>>> updated";

/// Suffix appended to the original path to name the conflict file.
pub const CONFLICT_SUFFIX: &str = ".conflict";

fn push_block<'a>(out: &mut Vec<&'a str>, conflict: &'a Conflict) {
    out.push(CURRENT_MARKER);
    if !conflict.current.is_empty() {
        out.extend(conflict.current.split('\n'));
    }
    out.push(SEPARATOR);
    if !conflict.updated.is_empty() {
        out.extend(conflict.updated.split('\n'));
    }
    out.push(UPDATED_MARKER);
}

/// Where a conflict's block goes in `line_count` content lines: the index to
/// insert at and how many content lines it stands in for.
fn anchor(conflict: &Conflict, line_count: usize) -> Option<(usize, usize)> {
    if let Some(range) = &conflict.output_lines {
        let start = range.start.min(line_count);
        let end = range.end.clamp(start, line_count);
        return Some((start, end - start));
    }
    if conflict.is_line_addressable() {
        return Some(((conflict.start_line - 1).min(line_count), 0));
    }
    None
}

/// Render `content` with a marker block for every conflict.
///
/// The output contains exactly one `<<<<<<<` line per conflict. Merged lines
/// outside the located conflict spans are always kept.
pub fn format_conflict_markers(content: &[u8], conflicts: &[Conflict]) -> Vec<u8> {
    let text = String::from_utf8_lossy(content);
    let (body, trailing_newline) = match text.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (&text[..], false),
    };
    let lines: Vec<&str> = if body.is_empty() && !trailing_newline {
        Vec::new()
    } else {
        body.split('\n').collect()
    };

    let mut anchored: BTreeMap<usize, Vec<(&Conflict, usize)>> = BTreeMap::new();
    let mut trailing: Vec<&Conflict> = Vec::new();
    for conflict in conflicts {
        match anchor(conflict, lines.len()) {
            Some((at, len)) => anchored.entry(at).or_default().push((conflict, len)),
            None => trailing.push(conflict),
        }
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + conflicts.len() * 5);
    let mut skip_until = 0;
    let mut ends_in_block = false;
    for idx in 0..=lines.len() {
        if let Some(group) = anchored.get(&idx) {
            for (conflict, len) in group {
                push_block(&mut out, conflict);
                skip_until = skip_until.max(idx + len);
            }
            ends_in_block = true;
        }
        if idx < lines.len() && idx >= skip_until {
            out.push(lines[idx]);
            ends_in_block = false;
        }
    }
    for conflict in &trailing {
        push_block(&mut out, conflict);
        ends_in_block = true;
    }

    let mut rendered = out.join("\n");
    if trailing_newline || ends_in_block {
        rendered.push('\n');
    }
    rendered.into_bytes()
}

/// Path of the conflict file for `original`: `<original>.conflict`.
pub fn conflict_path(original: &Path) -> PathBuf {
    let mut name = OsString::from(original.as_os_str());
    name.push(CONFLICT_SUFFIX);
    PathBuf::from(name)
}

/// Write the marker-annotated merge next to `original` and return its path.
///
/// The original file is never read or modified. Fails with
/// [`MergeError::NoConflicts`] when there is nothing to resolve.
pub fn write_conflict_file(
    original: &Path,
    merged: &[u8],
    conflicts: &[Conflict],
) -> Result<PathBuf, MergeError> {
    if conflicts.is_empty() {
        return Err(MergeError::NoConflicts);
    }

    let path = conflict_path(original);
    let annotated = format_conflict_markers(merged, conflicts);
    fs::write(&path, annotated).map_err(|source| MergeError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::warn!(
        path = %path.display(),
        conflicts = conflicts.len(),
        "wrote conflict file"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::merge_lines;
    use crate::types::MergeScenario;

    fn line_conflict(line: usize, current: &str, updated: &str) -> Conflict {
        Conflict {
            start_line: line,
            end_line: line,
            base: "B".into(),
            current: current.into(),
            updated: updated.into(),
            key: None,
            output_lines: None,
        }
    }

    fn render(base: &str, current: &str, updated: &str) -> String {
        let result = merge_lines(&MergeScenario::new(base, current, updated));
        String::from_utf8(format_conflict_markers(&result.content, &result.conflicts)).unwrap()
    }

    fn marker_count(bytes: &[u8]) -> usize {
        String::from_utf8_lossy(bytes)
            .lines()
            .filter(|l| l.starts_with("<<<<<<<"))
            .count()
    }

    #[test]
    fn test_block_replaces_located_lines() {
        let conflict = Conflict {
            output_lines: Some(1..2),
            ..line_conflict(2, "Bu", "Bt")
        };
        let out = format_conflict_markers(b"A\nBu\nC\n", &[conflict]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "A\n<<<<<<< current\nBu\n=======\nBt\n>>>>>>> updated\nC\n"
        );
    }

    #[test]
    fn test_unlocated_block_is_inserted_without_dropping_lines() {
        let out = format_conflict_markers(b"A\nC\n", &[line_conflict(2, "", "B2")]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "A\n<<<<<<< current\n=======\nB2\n>>>>>>> updated\nC\n"
        );
    }

    #[test]
    fn test_markers_for_shrunk_region_keep_following_lines() {
        assert_eq!(
            render("A\nB1\nB2\nD", "A\nX\nD", "A\nY\nD"),
            "A\n<<<<<<< current\nX\n=======\nY\n>>>>>>> updated\nD"
        );
    }

    #[test]
    fn test_markers_for_delete_versus_edit() {
        assert_eq!(
            render("A\nB\nC", "A\nC", "A\nB2\nC"),
            "A\n<<<<<<< current\n=======\nB2\n>>>>>>> updated\nC"
        );
    }

    #[test]
    fn test_markers_after_user_inserted_lines_above() {
        let out = render("A\nB\nC", "X\nY\nA\nBu\nC", "A\nBt\nC");
        assert_eq!(
            out,
            "X\nY\nA\n<<<<<<< current\nBu\n=======\nBt\n>>>>>>> updated\nC"
        );
        assert_eq!(out.matches("Bu").count(), 1);
    }

    #[test]
    fn test_markers_keep_trailing_newline() {
        assert_eq!(
            render("A\nB\nC\n", "A\nBu\nC\n", "A\nBt\nC\n"),
            "A\n<<<<<<< current\nBu\n=======\nBt\n>>>>>>> updated\nC\n"
        );
    }

    #[test]
    fn test_marker_count_for_real_line_merge() {
        let result = merge_lines(&MergeScenario::new(
            "a\nb\nc\nd\ne\nf",
            "a\nb-mine\nc\nd\nf",
            "a\nb-tmpl\nc\nd\ne-tmpl\nf",
        ));
        assert_eq!(result.conflicts.len(), 2);
        let out = format_conflict_markers(&result.content, &result.conflicts);
        assert_eq!(marker_count(&out), 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("a\n<<<<<<< current\nb-mine\n"));
        assert!(text.contains("\nc\nd\n<<<<<<< current\n=======\ne-tmpl\n>>>>>>> updated\nf"));
    }

    #[test]
    fn test_out_of_range_and_unaddressed_append() {
        let conflicts = vec![
            line_conflict(9, "x", "y"),
            Conflict::unaddressed("a.b", "1".into(), "2".into(), "3".into()),
        ];
        let out = String::from_utf8(format_conflict_markers(b"A\nB", &conflicts)).unwrap();
        assert!(out.starts_with("A\nB\n<<<<<<< current\nx\n"));
        assert!(out.ends_with("2\n=======\n3\n>>>>>>> updated\n"));
    }

    #[test]
    fn test_marker_count_matches_conflicts() {
        let conflicts = vec![
            line_conflict(1, "a1", "a2"),
            line_conflict(1, "b1", "b2"),
            line_conflict(3, "", "c2"),
            line_conflict(40, "d1", "d2"),
            Conflict::unaddressed("k", String::new(), "e1".into(), "e2".into()),
        ];
        let out = format_conflict_markers(b"one\ntwo\nthree\nfour\n", &conflicts);
        assert_eq!(marker_count(&out), conflicts.len());
        assert_eq!(marker_count(&format_conflict_markers(b"", &[])), 0);
    }

    #[test]
    fn test_write_conflict_file_leaves_original_alone() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("notes.txt");
        fs::write(&original, "untouched").unwrap();

        let written =
            write_conflict_file(&original, b"A\nBu\nC", &[line_conflict(2, "Bu", "Bt")]).unwrap();

        assert_eq!(written, dir.path().join("notes.txt.conflict"));
        assert_eq!(fs::read_to_string(&original).unwrap(), "untouched");
        let annotated = fs::read_to_string(&written).unwrap();
        assert!(annotated.contains(CURRENT_MARKER));
        assert!(annotated.contains(UPDATED_MARKER));
    }

    #[test]
    fn test_write_conflict_file_requires_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("notes.txt");
        let err = write_conflict_file(&original, b"A", &[]).unwrap_err();
        assert!(matches!(err, MergeError::NoConflicts));
        assert!(!conflict_path(&original).exists());
    }
}
