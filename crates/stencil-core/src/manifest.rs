use crate::review::FileReview;
use chrono::{DateTime, Utc};
use merge_engine::{write_conflict_file, MergeEngine, MergeError, MergeResult, MergeScenario};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;

/// A batch of files to merge, read from a JSON manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Logical template path; drives strategy selection.
    pub path: PathBuf,
    pub base: PathBuf,
    pub current: PathBuf,
    pub updated: PathBuf,
    /// Where to write the merged file. Defaults to `current`.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl ManifestEntry {
    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.current)
    }
}

impl Manifest {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).await?;
        let manifest: Manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }
}

pub struct BatchItem {
    pub entry: ManifestEntry,
    pub result: MergeResult,
    pub review: FileReview,
}

pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub items: Vec<BatchItem>,
    /// True when cancellation stopped the batch before every entry ran.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn conflict_count(&self) -> usize {
        self.items.iter().map(|i| i.review.conflict_count).sum()
    }
}

/// Merge every entry in order. Nothing is written here.
///
/// The cancellation flag is checked between files: once it is set no new
/// entry starts, and the results already produced are returned.
pub async fn run_batch(
    engine: &MergeEngine,
    manifest: &Manifest,
    cancel: &AtomicBool,
) -> anyhow::Result<BatchReport> {
    let started_at = Utc::now();
    let mut items = Vec::with_capacity(manifest.entries.len());
    let mut cancelled = false;

    for entry in &manifest.entries {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            break;
        }

        let base = fs::read(&entry.base).await?;
        let current = fs::read(&entry.current).await?;
        let updated = fs::read(&entry.updated).await?;

        // The flag may have been set while reading.
        let result = match engine.merge_file(cancel, &entry.path, &base, &current, &updated) {
            Ok(result) => result,
            Err(MergeError::Cancelled { .. }) => {
                cancelled = true;
                break;
            }
            Err(e) => return Err(e.into()),
        };
        let scenario = MergeScenario::new(base.as_slice(), current.as_slice(), updated.as_slice());
        let review = FileReview::new(&entry.path, &scenario, &result);
        tracing::debug!(path = %entry.path.display(), risk = %review.risk, "reviewed");

        items.push(BatchItem {
            entry: entry.clone(),
            result,
            review,
        });
    }

    if cancelled {
        tracing::warn!(
            done = items.len(),
            remaining = manifest.entries.len() - items.len(),
            "batch cancelled"
        );
    }

    Ok(BatchReport {
        started_at,
        finished_at: Utc::now(),
        items,
        cancelled,
    })
}

/// Write merged content for every item, plus `.conflict` files when enabled.
/// Uses tmp+rename so a reader never sees a half-written file.
pub async fn write_outputs(report: &BatchReport, write_conflict_files: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for item in &report.items {
        let target = item.entry.output_path();
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let tmp = target.with_extension("stencil.tmp");
        fs::write(&tmp, &item.result.content).await?;
        fs::rename(&tmp, target).await?;
        written.push(target.to_path_buf());

        if write_conflict_files && item.result.has_conflict() {
            let path = write_conflict_file(target, &item.result.content, &item.result.conflicts)?;
            written.push(path);
        }
    }
    Ok(written)
}
