//! The engine facade.
//!
//! [`MergeEngine::merge_file`] picks a strategy from the path and dispatches
//! to the matching merger; [`MergeEngine::three_way_merge`] always merges
//! line by line. The engine holds only immutable state and performs no I/O.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::MergeError;
use crate::line::merge_lines;
use crate::merger::MergerRegistry;
use crate::strategy::{DefaultSelector, StrategySelector};
use crate::types::{MergeResult, MergeScenario, MergeStrategy};

pub struct MergeEngine {
    selector: Arc<dyn StrategySelector>,
    registry: MergerRegistry,
}

impl MergeEngine {
    /// An engine with the default selector and all built-in strategies.
    pub fn new() -> Self {
        Self::with_selector(Arc::new(DefaultSelector))
    }

    pub fn with_selector(selector: Arc<dyn StrategySelector>) -> Self {
        Self::with_registry(selector, MergerRegistry::new())
    }

    pub fn with_registry(selector: Arc<dyn StrategySelector>, registry: MergerRegistry) -> Self {
        Self { selector, registry }
    }

    pub fn selector(&self) -> &dyn StrategySelector {
        self.selector.as_ref()
    }

    /// Line-based three-way merge, regardless of content type.
    pub fn three_way_merge(
        &self,
        base: &[u8],
        current: &[u8],
        updated: &[u8],
    ) -> Result<MergeResult, MergeError> {
        let scenario = MergeScenario::new(base, current, updated);
        if scenario.is_unchanged() {
            return Ok(MergeResult::clean(base, MergeStrategy::LineMerge));
        }
        Ok(merge_lines(&MergeScenario::new(
            &*String::from_utf8_lossy(base),
            &*String::from_utf8_lossy(current),
            &*String::from_utf8_lossy(updated),
        )))
    }

    /// Strategy-aware merge of one file.
    ///
    /// `cancel` is checked once, before dispatch. A merge that has started
    /// always runs to completion; batch callers should check between files.
    pub fn merge_file(
        &self,
        cancel: &AtomicBool,
        path: &Path,
        base: &[u8],
        current: &[u8],
        updated: &[u8],
    ) -> Result<MergeResult, MergeError> {
        if cancel.load(Ordering::Relaxed) {
            tracing::warn!(path = %path.display(), "merge cancelled before start");
            return Err(MergeError::Cancelled {
                path: path.to_path_buf(),
            });
        }

        let strategy = self.selector.select_strategy(path);
        let merger = self
            .registry
            .get(strategy)
            .ok_or(MergeError::UnsupportedStrategy(strategy))?;

        let scenario = MergeScenario::new(base, current, updated);
        let result = if scenario.is_unchanged() {
            MergeResult::clean(base, strategy)
        } else {
            merger.merge(&scenario)?
        };

        tracing::info!(
            path = %path.display(),
            strategy = %strategy,
            conflicts = result.conflicts.len(),
            "merged file"
        );
        Ok(result)
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}
