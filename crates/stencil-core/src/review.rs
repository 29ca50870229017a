use merge_engine::diff::line_stats;
use merge_engine::{MergeResult, MergeScenario, MergeStrategy};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Classify one merge outcome against the inputs it came from.
    pub fn classify(scenario: &MergeScenario<&[u8]>, result: &MergeResult) -> Self {
        let customized = scenario.current != scenario.base;
        if result.has_conflict() || (result.strategy == MergeStrategy::Overwrite && customized) {
            RiskLevel::High
        } else if customized && result.content.as_slice() != scenario.current {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a reviewer needs to know about one merged file before it is written.
#[derive(Debug, Clone, Serialize)]
pub struct FileReview {
    pub path: PathBuf,
    pub summary: String,
    pub strategy: MergeStrategy,
    pub risk: RiskLevel,
    pub has_conflicts: bool,
    pub conflict_count: usize,
}

impl FileReview {
    pub fn new(path: impl Into<PathBuf>, scenario: &MergeScenario<&[u8]>, result: &MergeResult) -> Self {
        Self::from_results(path, scenario, std::slice::from_ref(result))
    }

    /// Aggregate several results for the same path. Risk is the highest of
    /// the parts, conflicts are summed, and the first result names the
    /// strategy and supplies the summary.
    pub fn from_results(
        path: impl Into<PathBuf>,
        scenario: &MergeScenario<&[u8]>,
        results: &[MergeResult],
    ) -> Self {
        let risk = results
            .iter()
            .map(|r| RiskLevel::classify(scenario, r))
            .max()
            .unwrap_or(RiskLevel::Low);
        let conflict_count: usize = results.iter().map(|r| r.conflicts.len()).sum();
        let strategy = results
            .first()
            .map(|r| r.strategy)
            .unwrap_or(MergeStrategy::Overwrite);
        let summary = match results.first() {
            Some(first) => summarize(scenario.current, &first.content),
            None => "no changes".to_string(),
        };

        Self {
            path: path.into(),
            summary,
            strategy,
            risk,
            has_conflicts: conflict_count > 0,
            conflict_count,
        }
    }
}

fn summarize(current: &[u8], merged: &[u8]) -> String {
    let (added, removed) = line_stats(
        &String::from_utf8_lossy(current),
        &String::from_utf8_lossy(merged),
    );
    if added == 0 && removed == 0 {
        "no changes".to_string()
    } else {
        format!("+{added} -{removed} lines")
    }
}
