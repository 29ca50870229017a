//! Core types for the merge engine.
//!
//! Every merge works on a [`MergeScenario`] of three revisions of one file:
//! - **base**: the template as originally installed
//! - **current**: the user's customized copy
//! - **updated**: the newly released template
//!
//! All values here are plain data, built fresh per merge and owned by the
//! caller once returned.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// The three-way merge scenario: base, current, and updated revisions.
#[derive(Debug, Clone, Copy)]
pub struct MergeScenario<T> {
    pub base: T,
    pub current: T,
    pub updated: T,
}

impl<T> MergeScenario<T> {
    pub fn new(base: T, current: T, updated: T) -> Self {
        Self {
            base,
            current,
            updated,
        }
    }
}

impl MergeScenario<&[u8]> {
    /// True when all three revisions are byte-identical.
    pub fn is_unchanged(&self) -> bool {
        self.base == self.current && self.base == self.updated
    }
}

/// Which side of a scenario a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Base,
    Current,
    Updated,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Base => "base",
            Side::Current => "current",
            Side::Updated => "updated",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge algorithm chosen for a file. Picked once per file by a
/// [`StrategySelector`](crate::strategy::StrategySelector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Line-level three-way merge for plain text.
    LineMerge,
    /// Recursive key merge of a YAML document.
    YamlDeep,
    /// Recursive key merge of a JSON document.
    JsonMerge,
    /// Heading-delimited section merge (project instruction files).
    SectionMerge,
    /// Order-insensitive set merge of line entries (ignore files).
    EntryMerge,
    /// Take the updated template verbatim.
    Overwrite,
}

impl MergeStrategy {
    pub const ALL: [MergeStrategy; 6] = [
        MergeStrategy::LineMerge,
        MergeStrategy::YamlDeep,
        MergeStrategy::JsonMerge,
        MergeStrategy::SectionMerge,
        MergeStrategy::EntryMerge,
        MergeStrategy::Overwrite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::LineMerge => "line-merge",
            MergeStrategy::YamlDeep => "yaml-deep",
            MergeStrategy::JsonMerge => "json-merge",
            MergeStrategy::SectionMerge => "section-merge",
            MergeStrategy::EntryMerge => "entry-merge",
            MergeStrategy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single point of unresolved three-way divergence.
///
/// `start_line`/`end_line` are 1-based and inclusive, and refer to lines of
/// the base document. Structured and section merges have no meaningful line
/// and report `0` for both; treat `0` as "not line-addressable".
///
/// Base line numbers say nothing about where the conflict sits in the merged
/// content. `output_lines` does: the 0-based, half-open range of merged lines
/// that hold the kept `current` text. Only line merges set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub start_line: usize,
    pub end_line: usize,
    pub base: String,
    pub current: String,
    pub updated: String,
    /// Dotted key path (structured merges) or heading text (section merges).
    pub key: Option<String>,
    #[serde(skip)]
    pub output_lines: Option<Range<usize>>,
}

impl Conflict {
    /// A conflict with no usable line position.
    pub fn unaddressed(key: impl Into<String>, base: String, current: String, updated: String) -> Self {
        Self {
            start_line: 0,
            end_line: 0,
            base,
            current,
            updated,
            key: Some(key.into()),
            output_lines: None,
        }
    }

    pub fn is_line_addressable(&self) -> bool {
        self.start_line > 0
    }
}

/// Outcome of merging one file.
///
/// `content` is always a complete best-effort merge, even when conflicts
/// were found; conflicts are informational and never block the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub content: Vec<u8>,
    pub conflicts: Vec<Conflict>,
    pub strategy: MergeStrategy,
}

impl MergeResult {
    pub fn clean(content: impl Into<Vec<u8>>, strategy: MergeStrategy) -> Self {
        Self {
            content: content.into(),
            conflicts: Vec::new(),
            strategy,
        }
    }

    pub fn with_conflicts(
        content: impl Into<Vec<u8>>,
        conflicts: Vec<Conflict>,
        strategy: MergeStrategy,
    ) -> Self {
        Self {
            content: content.into(),
            conflicts,
            strategy,
        }
    }

    pub fn has_conflict(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Merged content as text, replacing invalid UTF-8.
    pub fn content_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Kind of an [`Edit`]. A modified line is a `Delete` followed by an `Insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    Insert,
    Delete,
}

/// One step of a line edit script.
///
/// Indices are 0-based. For a `Delete`, `old_line` is the removed line and
/// `new_line` the position in the new sequence where it disappeared. For an
/// `Insert`, `old_line` is the insertion point in the old sequence and
/// `new_line` the index of `new_text` in the new sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub op: EditOp,
    pub old_line: usize,
    pub new_line: usize,
    pub new_text: String,
}

impl Edit {
    pub fn delete(old_line: usize, new_line: usize) -> Self {
        Self {
            op: EditOp::Delete,
            old_line,
            new_line,
            new_text: String::new(),
        }
    }

    pub fn insert(old_line: usize, new_line: usize, new_text: impl Into<String>) -> Self {
        Self {
            op: EditOp::Insert,
            old_line,
            new_line,
            new_text: new_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_conflict_tracks_conflict_list() {
        let clean = MergeResult::clean("a", MergeStrategy::LineMerge);
        assert!(!clean.has_conflict());

        let conflicted = MergeResult::with_conflicts(
            "a",
            vec![Conflict::unaddressed("k", "1".into(), "2".into(), "3".into())],
            MergeStrategy::JsonMerge,
        );
        assert!(conflicted.has_conflict());
        assert!(!conflicted.conflicts[0].is_line_addressable());
    }

    #[test]
    fn test_strategy_serde_names() {
        for strategy in MergeStrategy::ALL {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy.as_str()));
            let back: MergeStrategy = serde_json::from_str(&json).unwrap();
            assert_eq!(back, strategy);
        }
    }
}
