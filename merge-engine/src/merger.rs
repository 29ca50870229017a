//! Pluggable merge strategies.
//!
//! Every strategy implements [`Merger`]; the engine looks up the merger for
//! the strategy its selector picked in a [`MergerRegistry`]. The registry is
//! built once and never mutated, so an engine can be shared freely across
//! threads.

use std::borrow::Cow;

use crate::entry::merge_entries;
use crate::error::MergeError;
use crate::line::merge_lines;
use crate::overwrite::merge_overwrite;
use crate::section::merge_sections;
use crate::structured::{merge_structured, strategy_for};
use crate::types::{MergeResult, MergeScenario, MergeStrategy};
use crate::value::DocumentFormat;

/// A merge algorithm for one [`MergeStrategy`].
pub trait Merger: Send + Sync {
    /// The strategy this merger implements.
    fn strategy(&self) -> MergeStrategy;

    /// Merge three revisions of a file.
    fn merge(&self, scenario: &MergeScenario<&[u8]>) -> Result<MergeResult, MergeError>;
}

fn as_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn text_scenario<'a>(scenario: &MergeScenario<&'a [u8]>) -> MergeScenario<Cow<'a, str>> {
    MergeScenario::new(
        as_text(scenario.base),
        as_text(scenario.current),
        as_text(scenario.updated),
    )
}

pub struct LineMerger;

impl Merger for LineMerger {
    fn strategy(&self) -> MergeStrategy {
        MergeStrategy::LineMerge
    }

    fn merge(&self, scenario: &MergeScenario<&[u8]>) -> Result<MergeResult, MergeError> {
        let text = text_scenario(scenario);
        Ok(merge_lines(&MergeScenario::new(
            &*text.base,
            &*text.current,
            &*text.updated,
        )))
    }
}

pub struct StructuredMerger {
    format: DocumentFormat,
}

impl StructuredMerger {
    pub fn new(format: DocumentFormat) -> Self {
        Self { format }
    }
}

impl Merger for StructuredMerger {
    fn strategy(&self) -> MergeStrategy {
        strategy_for(self.format)
    }

    fn merge(&self, scenario: &MergeScenario<&[u8]>) -> Result<MergeResult, MergeError> {
        merge_structured(self.format, scenario)
    }
}

pub struct SectionMerger;

impl Merger for SectionMerger {
    fn strategy(&self) -> MergeStrategy {
        MergeStrategy::SectionMerge
    }

    fn merge(&self, scenario: &MergeScenario<&[u8]>) -> Result<MergeResult, MergeError> {
        let text = text_scenario(scenario);
        Ok(merge_sections(&MergeScenario::new(
            &*text.base,
            &*text.current,
            &*text.updated,
        )))
    }
}

pub struct EntryMerger;

impl Merger for EntryMerger {
    fn strategy(&self) -> MergeStrategy {
        MergeStrategy::EntryMerge
    }

    fn merge(&self, scenario: &MergeScenario<&[u8]>) -> Result<MergeResult, MergeError> {
        let text = text_scenario(scenario);
        Ok(merge_entries(&MergeScenario::new(
            &*text.base,
            &*text.current,
            &*text.updated,
        )))
    }
}

pub struct OverwriteMerger;

impl Merger for OverwriteMerger {
    fn strategy(&self) -> MergeStrategy {
        MergeStrategy::Overwrite
    }

    fn merge(&self, scenario: &MergeScenario<&[u8]>) -> Result<MergeResult, MergeError> {
        Ok(merge_overwrite(scenario))
    }
}

/// Registry of mergers, keyed by strategy. First registration wins.
pub struct MergerRegistry {
    mergers: Vec<Box<dyn Merger>>,
}

impl MergerRegistry {
    /// A registry with all six built-in strategies.
    pub fn new() -> Self {
        Self::with_mergers(vec![
            Box::new(LineMerger),
            Box::new(StructuredMerger::new(DocumentFormat::Yaml)),
            Box::new(StructuredMerger::new(DocumentFormat::Json)),
            Box::new(SectionMerger),
            Box::new(EntryMerger),
            Box::new(OverwriteMerger),
        ])
    }

    /// A registry with exactly the given mergers.
    pub fn with_mergers(mergers: Vec<Box<dyn Merger>>) -> Self {
        Self { mergers }
    }

    pub fn get(&self, strategy: MergeStrategy) -> Option<&dyn Merger> {
        self.mergers
            .iter()
            .find(|m| m.strategy() == strategy)
            .map(|m| m.as_ref())
    }

    pub fn strategies(&self) -> Vec<MergeStrategy> {
        self.mergers.iter().map(|m| m.strategy()).collect()
    }
}

impl Default for MergerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
