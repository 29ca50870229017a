//! Set merge for line-entry files such as `.gitignore`.
//!
//! Each non-blank line is an independent entry; order carries no meaning.
//! The user's entries and ordering are kept, entries the user removed stay
//! removed, and genuinely new template entries are appended. Set union with
//! deletion tracking cannot diverge, so this strategy never conflicts.

use std::collections::HashSet;

use crate::types::{MergeResult, MergeScenario, MergeStrategy};

fn entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

pub fn merge_entries(scenario: &MergeScenario<&str>) -> MergeResult {
    let base: HashSet<&str> = entries(scenario.base).collect();
    let current: HashSet<&str> = entries(scenario.current).collect();
    let deleted: HashSet<&str> = base.difference(&current).copied().collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<&str> = Vec::new();

    for entry in entries(scenario.current) {
        if seen.insert(entry) {
            out.push(entry);
        }
    }

    let mut added = 0usize;
    for entry in entries(scenario.updated) {
        if base.contains(entry) || deleted.contains(entry) {
            continue;
        }
        if seen.insert(entry) {
            out.push(entry);
            added += 1;
        }
    }

    tracing::debug!(
        entries = out.len(),
        added,
        user_deleted = deleted.len(),
        "entry merge finished"
    );

    let mut content = out.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    MergeResult::clean(content, MergeStrategy::EntryMerge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(base: &str, current: &str, updated: &str) -> MergeResult {
        merge_entries(&MergeScenario::new(base, current, updated))
    }

    fn lines(result: &MergeResult) -> Vec<String> {
        result.content_lossy().lines().map(String::from).collect()
    }

    #[test]
    fn test_user_and_template_additions() {
        let result = merge(
            "*.pyc\n.env\n",
            "*.pyc\n.env\nmy_file\n",
            "*.pyc\n.env\n.cache/\n",
        );
        assert_eq!(lines(&result), vec!["*.pyc", ".env", "my_file", ".cache/"]);
        assert!(!result.has_conflict());
        assert_eq!(result.strategy, MergeStrategy::EntryMerge);
    }

    #[test]
    fn test_user_deletion_is_never_readded() {
        let result = merge("a\nb\n", "a\n", "a\nb\nc\n");
        assert_eq!(lines(&result), vec!["a", "c"]);
    }

    #[test]
    fn test_user_order_and_dedup() {
        let result = merge("a\nb\n", "b\na\nb\n\n  a  \n", "a\nb\n");
        assert_eq!(lines(&result), vec!["b", "a"]);
    }

    #[test]
    fn test_template_removal_keeps_user_copy() {
        let result = merge("a\nb\n", "a\nb\n", "a\n");
        assert_eq!(lines(&result), vec!["a", "b"]);
    }

    #[test]
    fn test_identical_inputs() {
        let text = "target/\n*.log\n";
        let result = merge(text, text, text);
        assert_eq!(result.content_lossy(), text);
    }
}
