use crate::config::StrategyOverride;
use merge_engine::{DefaultSelector, MergeStrategy, StrategySelector};
use std::path::Path;

/// Strategy selection with user overrides from `settings.json`.
/// Overrides are tried in order; the built-in rules apply when none match.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredSelector {
    overrides: Vec<StrategyOverride>,
}

impl ConfiguredSelector {
    pub fn new(overrides: Vec<StrategyOverride>) -> Self {
        Self { overrides }
    }
}

impl StrategySelector for ConfiguredSelector {
    fn select_strategy(&self, path: &Path) -> MergeStrategy {
        match self.overrides.iter().find(|o| o.matches(path)) {
            Some(rule) => {
                tracing::debug!(
                    path = %path.display(),
                    pattern = %rule.pattern,
                    strategy = %rule.strategy,
                    "strategy override"
                );
                rule.strategy
            }
            None => DefaultSelector.select_strategy(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_override_wins_then_defaults() {
        let selector = ConfiguredSelector::new(vec![
            StrategyOverride {
                pattern: "Makefile".into(),
                strategy: MergeStrategy::LineMerge,
            },
            StrategyOverride {
                pattern: "Makefile".into(),
                strategy: MergeStrategy::EntryMerge,
            },
        ]);
        assert_eq!(
            selector.select_strategy(Path::new("Makefile")),
            MergeStrategy::LineMerge
        );
        assert_eq!(
            selector.select_strategy(Path::new("a.json")),
            MergeStrategy::JsonMerge
        );
    }
}
