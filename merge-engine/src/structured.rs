//! Three-way merge of key/value documents.
//!
//! Both sides are compared key by key against the base. A key changed on
//! only one side takes that side's value; a key changed identically on both
//! sides is kept once; nested mappings changed on both sides are merged
//! recursively. Anything else is a conflict, and the user's value is kept.
//!
//! Deletions are asymmetric: a key the user removed stays removed, while a
//! key the template removed survives if the user still has it.

use std::collections::BTreeSet;

use crate::error::MergeError;
use crate::types::{Conflict, MergeResult, MergeScenario, MergeStrategy, Side};
use crate::value::{DocumentFormat, Mapping, Value, values_equal};

/// Merge three parsed mappings.
///
/// `key_path` prefixes the keys reported in conflicts; pass `""` at the root.
/// Conflicts come back in key order, depth first.
pub fn deep_merge_map(
    base: &Mapping,
    current: &Mapping,
    updated: &Mapping,
    key_path: &str,
) -> (Mapping, Vec<Conflict>) {
    let mut merged = Mapping::new();
    let mut conflicts = Vec::new();

    let keys: BTreeSet<&String> = base
        .keys()
        .chain(current.keys())
        .chain(updated.keys())
        .collect();

    for key in keys {
        let path = if key_path.is_empty() {
            key.clone()
        } else {
            format!("{key_path}.{key}")
        };

        let resolved = match (base.get(key), current.get(key), updated.get(key)) {
            // Added on one side only.
            (None, Some(c), None) => Some(c.clone()),
            (None, None, Some(u)) => Some(u.clone()),
            // Added on both sides.
            (None, Some(c), Some(u)) => {
                if !values_equal(c, u) {
                    conflicts.push(conflict(&path, None, Some(c), Some(u)));
                }
                Some(c.clone())
            }
            // The user's deletion wins over anything the template did.
            (Some(_), None, _) => None,
            // The template's deletion does not override the user's copy.
            (Some(_), Some(c), None) => Some(c.clone()),
            (Some(b), Some(c), Some(u)) => {
                let current_changed = !values_equal(b, c);
                let updated_changed = !values_equal(b, u);
                match (current_changed, updated_changed) {
                    (false, false) => Some(b.clone()),
                    (true, false) => Some(c.clone()),
                    (false, true) => Some(u.clone()),
                    (true, true) if values_equal(c, u) => Some(c.clone()),
                    (true, true) => match (c, u) {
                        (Value::Mapping(cm), Value::Mapping(um)) => {
                            let empty = Mapping::new();
                            let bm = b.as_mapping().unwrap_or(&empty);
                            let (sub, sub_conflicts) = deep_merge_map(bm, cm, um, &path);
                            conflicts.extend(sub_conflicts);
                            Some(Value::Mapping(sub))
                        }
                        _ => {
                            conflicts.push(conflict(&path, Some(b), Some(c), Some(u)));
                            Some(c.clone())
                        }
                    },
                }
            }
            (None, None, None) => None,
        };

        if let Some(value) = resolved {
            merged.insert(key.clone(), value);
        }
    }

    (merged, conflicts)
}

fn conflict(path: &str, base: Option<&Value>, current: Option<&Value>, updated: Option<&Value>) -> Conflict {
    let render = |v: Option<&Value>| v.map(Value::render).unwrap_or_default();
    Conflict::unaddressed(path, render(base), render(current), render(updated))
}

/// Parse all three sides, merge, and render the result in the same format.
pub fn merge_structured(
    format: DocumentFormat,
    scenario: &MergeScenario<&[u8]>,
) -> Result<MergeResult, MergeError> {
    let base = format.parse(Side::Base, scenario.base)?;
    let current = format.parse(Side::Current, scenario.current)?;
    let updated = format.parse(Side::Updated, scenario.updated)?;

    let (merged, conflicts) = deep_merge_map(&base, &current, &updated, "");
    let content = format.render(&merged)?;

    tracing::debug!(
        format = %format,
        keys = merged.len(),
        conflicts = conflicts.len(),
        "structured merge finished"
    );

    Ok(MergeResult::with_conflicts(
        content,
        conflicts,
        strategy_for(format),
    ))
}

pub fn strategy_for(format: DocumentFormat) -> MergeStrategy {
    match format {
        DocumentFormat::Json => MergeStrategy::JsonMerge,
        DocumentFormat::Yaml => MergeStrategy::YamlDeep,
    }
}
