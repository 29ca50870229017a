//! Three-way merge of plain text, line by line.
//!
//! Both sides are diffed against the base. Walking the base, each changed
//! region is classified by who touched it:
//!
//! | current | updated | result |
//! |---|---|---|
//! | - | - | base |
//! | changed | - | current |
//! | - | changed | updated |
//! | changed | same change | that change |
//! | changed | different change | conflict, current kept inline |
//!
//! Changes on adjacent lines do not interact. Lines that both sides insert
//! at the same spot without replacing anything are all kept, current's
//! first, with a shared leading run emitted only once.

use crate::diff::{Hunk, diff_lines, hunks, split_lines};
use crate::types::{Conflict, MergeResult, MergeScenario, MergeStrategy};

/// Merge three texts. The result strategy is always [`MergeStrategy::LineMerge`].
pub fn merge_lines(scenario: &MergeScenario<&str>) -> MergeResult {
    let base = split_lines(scenario.base);
    let current = split_lines(scenario.current);
    let updated = split_lines(scenario.updated);

    let current_hunks = hunks(&diff_lines(&base, &current));
    let updated_hunks = hunks(&diff_lines(&base, &updated));

    let mut out: Vec<String> = Vec::with_capacity(base.len());
    let mut conflicts = Vec::new();

    let mut pos = 0;
    let (mut ci, mut ui) = (0, 0);

    loop {
        let next_c = current_hunks.get(ci).map(|h| h.old_start);
        let next_u = updated_hunks.get(ui).map(|h| h.old_start);
        let start = match (next_c, next_u) {
            (None, None) => break,
            (Some(c), None) => c,
            (None, Some(u)) => u,
            (Some(c), Some(u)) => c.min(u),
        };

        out.extend(base[pos..start].iter().map(|l| l.to_string()));

        // Collect every hunk overlapping the region that opens at `start`.
        let mut end = start;
        let (c_from, u_from) = (ci, ui);
        loop {
            let mut grew = false;
            while let Some(h) = current_hunks.get(ci) {
                if !joins_region(h, start, end) {
                    break;
                }
                end = end.max(h.old_end);
                ci += 1;
                grew = true;
            }
            while let Some(h) = updated_hunks.get(ui) {
                if !joins_region(h, start, end) {
                    break;
                }
                end = end.max(h.old_end);
                ui += 1;
                grew = true;
            }
            if !grew {
                break;
            }
        }

        let region = &base[start..end];
        let c_hunks = &current_hunks[c_from..ci];
        let u_hunks = &updated_hunks[u_from..ui];

        match (c_hunks.is_empty(), u_hunks.is_empty()) {
            (false, true) => out.extend(rebuild(region, start, c_hunks)),
            (true, false) => out.extend(rebuild(region, start, u_hunks)),
            (false, false) => {
                let mine = rebuild(region, start, c_hunks);
                let theirs = rebuild(region, start, u_hunks);
                if mine == theirs {
                    out.extend(mine);
                } else if region.is_empty() {
                    out.extend(coalesce_insertions(mine, theirs));
                } else {
                    conflicts.push(Conflict {
                        start_line: start + 1,
                        end_line: end,
                        base: region.join("\n"),
                        current: mine.join("\n"),
                        updated: theirs.join("\n"),
                        key: None,
                        output_lines: Some(out.len()..out.len() + mine.len()),
                    });
                    out.extend(mine);
                }
            }
            (true, true) => {}
        }

        pos = end;
    }

    out.extend(base[pos..].iter().map(|l| l.to_string()));

    if !conflicts.is_empty() {
        tracing::debug!(conflicts = conflicts.len(), "line merge found conflicts");
    }

    MergeResult::with_conflicts(out.join("\n"), conflicts, MergeStrategy::LineMerge)
}

/// A hunk belongs to the region `start..end` if it overlaps it, or if it
/// opens at the same base position.
fn joins_region(h: &Hunk, start: usize, end: usize) -> bool {
    h.old_start == start || h.old_start < end
}

/// Reconstruct one side's text for the base region `start..` by applying
/// that side's hunks to it.
fn rebuild(region: &[&str], start: usize, side_hunks: &[Hunk]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = start;
    for h in side_hunks {
        out.extend(region[cursor - start..h.old_start - start].iter().map(|l| l.to_string()));
        out.extend(h.lines.iter().cloned());
        cursor = h.old_end;
    }
    out.extend(region[cursor - start..].iter().map(|l| l.to_string()));
    out
}

fn coalesce_insertions(mine: Vec<String>, theirs: Vec<String>) -> Vec<String> {
    let shared = mine
        .iter()
        .zip(theirs.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let mut out = mine;
    out.extend(theirs.into_iter().skip(shared));
    out
}
