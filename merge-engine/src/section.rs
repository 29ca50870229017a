//! Three-way merge of heading-delimited documents.
//!
//! A section opens at a level-2 or level-3 Markdown heading and runs to the
//! next one. Sections are matched across revisions by their exact heading
//! line and, when a heading repeats, by which occurrence it is. They are
//! merged as whole bodies. The output follows the updated template's section
//! order; sections only the user has are appended last, repeats included.

use std::collections::{HashMap, HashSet};

use crate::diff::split_lines;
use crate::types::{Conflict, MergeResult, MergeScenario, MergeStrategy};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section<'a> {
    heading: &'a str,
    body: Vec<&'a str>,
}

impl Section<'_> {
    fn body_text(&self) -> String {
        self.body.join("\n")
    }
}

#[derive(Debug, Default)]
struct Document<'a> {
    /// Lines before the first heading. Not merged.
    preamble: Vec<&'a str>,
    sections: Vec<Section<'a>>,
}

impl<'a> Document<'a> {
    fn parse(text: &'a str) -> Self {
        let mut doc = Document::default();
        let mut fence: Option<(char, usize)> = None;

        for line in split_lines(text) {
            if let Some((ch, len)) = fence_marker(line) {
                match fence {
                    None => fence = Some((ch, len)),
                    Some((open, open_len)) if ch == open && len >= open_len => fence = None,
                    Some(_) => {}
                }
            }

            if fence.is_none() && is_heading(line) {
                doc.sections.push(Section {
                    heading: line,
                    body: Vec::new(),
                });
            } else if let Some(section) = doc.sections.last_mut() {
                section.body.push(line);
            } else {
                doc.preamble.push(line);
            }
        }
        doc
    }

    /// Each section paired with its key: the heading and how many earlier
    /// sections share that heading.
    fn keyed(&self) -> Vec<(SectionKey<'a>, &Section<'a>)> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        self.sections
            .iter()
            .map(|section| {
                let n = seen.entry(section.heading).or_insert(0);
                let key = (section.heading, *n);
                *n += 1;
                (key, section)
            })
            .collect()
    }

    fn index(&self) -> HashMap<SectionKey<'a>, &Section<'a>> {
        self.keyed().into_iter().collect()
    }
}

type SectionKey<'a> = (&'a str, usize);

fn is_heading(line: &str) -> bool {
    line.starts_with("## ") || line.starts_with("### ")
}

/// Fence character and run length when `line` opens or closes a fenced
/// code block.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

/// Merge three heading-delimited documents.
///
/// For each template section:
/// - new in the template: taken as-is, unless the user independently added
///   a different body under the same heading; that is a conflict and the
///   user's body is kept so nothing the user wrote is lost
/// - removed by the user: restored from the template
/// - present everywhere: whole-body three-way comparison; divergent edits
///   conflict with `start_line = end_line = 0` and keep the user's body
pub fn merge_sections(scenario: &MergeScenario<&str>) -> MergeResult {
    let base = Document::parse(scenario.base);
    let current = Document::parse(scenario.current);
    let updated = Document::parse(scenario.updated);

    let base_index = base.index();
    let current_index = current.index();

    let mut lines: Vec<&str> = current.preamble.clone();
    let mut conflicts = Vec::new();
    let mut emitted: HashSet<SectionKey> = HashSet::new();

    for (key, tmpl) in updated.keyed() {
        emitted.insert(key);

        let chosen: &Section = match (base_index.get(&key).copied(), current_index.get(&key).copied()) {
            (None, None) => tmpl,
            (None, Some(mine)) => {
                if mine.body != tmpl.body {
                    conflicts.push(section_conflict(tmpl.heading, String::new(), mine, tmpl));
                }
                mine
            }
            (Some(_), None) => tmpl,
            (Some(orig), Some(mine)) => {
                let user_changed = mine.body != orig.body;
                let template_changed = tmpl.body != orig.body;
                match (user_changed, template_changed) {
                    (false, false) => orig,
                    (true, false) => mine,
                    (false, true) => tmpl,
                    (true, true) if mine.body == tmpl.body => mine,
                    (true, true) => {
                        conflicts.push(section_conflict(tmpl.heading, orig.body_text(), mine, tmpl));
                        mine
                    }
                }
            }
        };

        lines.push(chosen.heading);
        lines.extend(chosen.body.iter().copied());
    }

    for (key, mine) in current.keyed() {
        if emitted.insert(key) {
            lines.push(mine.heading);
            lines.extend(mine.body.iter().copied());
        }
    }

    let mut content = lines.join("\n");
    if scenario.current.ends_with('\n') && !content.ends_with('\n') {
        content.push('\n');
    }

    tracing::debug!(
        sections = emitted.len(),
        conflicts = conflicts.len(),
        "section merge finished"
    );

    MergeResult::with_conflicts(content, conflicts, MergeStrategy::SectionMerge)
}

fn section_conflict(heading: &str, base: String, mine: &Section, tmpl: &Section) -> Conflict {
    Conflict::unaddressed(heading, base, mine.body_text(), tmpl.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(base: &str, current: &str, updated: &str) -> MergeResult {
        merge_sections(&MergeScenario::new(base, current, updated))
    }

    const BASE: &str = "# Project\n\n## Setup\nrun make\n\n## Style\nuse tabs\n";

    #[test]
    fn test_identical_inputs() {
        let result = merge(BASE, BASE, BASE);
        assert_eq!(result.content_lossy(), BASE);
        assert!(!result.has_conflict());
        assert_eq!(result.strategy, MergeStrategy::SectionMerge);
    }

    #[test]
    fn test_template_edit_and_user_edit_in_different_sections() {
        let current = "# Project\n\n## Setup\nrun make\n\n## Style\nuse spaces\n";
        let updated = "# Project\n\n## Setup\nrun just\n\n## Style\nuse tabs\n";
        let result = merge(BASE, current, updated);
        assert!(!result.has_conflict());
        assert_eq!(
            result.content_lossy(),
            "# Project\n\n## Setup\nrun just\n\n## Style\nuse spaces\n"
        );
    }

    #[test]
    fn test_divergent_body_conflicts() {
        let current = "# Project\n\n## Setup\nrun cargo\n\n## Style\nuse tabs\n";
        let updated = "# Project\n\n## Setup\nrun just\n\n## Style\nuse tabs\n";
        let result = merge(BASE, current, updated);
        assert_eq!(result.conflicts.len(), 1);
        let conflict = &result.conflicts[0];
        assert_eq!((conflict.start_line, conflict.end_line), (0, 0));
        assert_eq!(conflict.key.as_deref(), Some("## Setup"));
        assert_eq!(conflict.base, "run make\n");
        assert_eq!(conflict.current, "run cargo\n");
        assert_eq!(conflict.updated, "run just\n");
        assert!(result.content_lossy().contains("run cargo"));
    }

    #[test]
    fn test_follows_template_order_and_appends_user_sections() {
        let current = "## Style\nuse tabs\n\n## Notes\nmine\n\n## Setup\nrun make\n";
        let updated = "## Setup\nrun make\n\n## Testing\ncargo test\n\n## Style\nuse tabs\n";
        let result = merge(BASE, current, updated);
        assert!(!result.has_conflict());
        let content = result.content_lossy();
        let setup = content.find("## Setup").unwrap();
        let testing = content.find("## Testing").unwrap();
        let style = content.find("## Style").unwrap();
        let notes = content.find("## Notes").unwrap();
        assert!(setup < testing && testing < style && style < notes);
    }

    #[test]
    fn test_user_removed_section_is_restored() {
        let current = "# Project\n\n## Setup\nrun make\n";
        let result = merge(BASE, current, BASE);
        assert!(result.content_lossy().contains("## Style\nuse tabs"));
    }

    #[test]
    fn test_headings_inside_fences_are_body() {
        let doc = Document::parse("## A\n```\n## not a heading\n```\n### B\nx");
        let headings: Vec<&str> = doc.sections.iter().map(|s| s.heading).collect();
        assert_eq!(headings, vec!["## A", "### B"]);
        assert!(Document::parse("# Title\n#### deep\n").sections.is_empty());
    }

    #[test]
    fn test_preamble_comes_from_current() {
        let current = "# My Project\n\n## Setup\nrun make\n\n## Style\nuse tabs\n";
        let result = merge(BASE, current, BASE);
        assert!(result.content_lossy().starts_with("# My Project\n"));
    }

    #[test]
    fn test_repeated_user_headings_are_all_kept() {
        let base = "## A\na\n";
        let current = "## A\na\n## Notes\none\n## Notes\ntwo\n";
        let result = merge(base, current, base);
        assert!(!result.has_conflict());
        assert_eq!(result.content_lossy(), current);
    }

    #[test]
    fn test_repeated_headings_match_by_occurrence() {
        let base = "## Step\none\n## Step\ntwo\n";
        let current = "## Step\none\n## Step\ntwo (mine)\n";
        let updated = "## Step\nONE\n## Step\ntwo\n";
        let result = merge(base, current, updated);
        assert!(!result.has_conflict());
        assert_eq!(result.content_lossy(), "## Step\nONE\n## Step\ntwo (mine)\n");
    }

    #[test]
    fn test_fence_closes_only_on_matching_marker() {
        let doc = Document::parse("## A\n```\n~~~\n## not a heading\n```\n### B\nx");
        let headings: Vec<&str> = doc.sections.iter().map(|s| s.heading).collect();
        assert_eq!(headings, vec!["## A", "### B"]);

        let doc = Document::parse("## A\n````\n```\n## still code\n````\n## C\n");
        let headings: Vec<&str> = doc.sections.iter().map(|s| s.heading).collect();
        assert_eq!(headings, vec!["## A", "## C"]);
    }

    #[test]
    fn test_section_added_on_both_sides_keeps_user_body() {
        let base = "## A\na\n";
        let current = "## A\na\n## New\nmine\n";
        let updated = "## A\na\n## New\ntheirs\n";
        let result = merge(base, current, updated);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].key.as_deref(), Some("## New"));
        assert_eq!(result.conflicts[0].base, "");
        assert_eq!(result.content_lossy(), current);
    }
}
