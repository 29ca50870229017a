use merge_engine::MergeStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub merge: MergeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    /// Directory for `stencil.log`. Defaults to `<data-dir>/logs`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    #[serde(default = "default_true")]
    pub write_conflict_files: bool,
    #[serde(default)]
    pub assume_yes: bool,
    #[serde(default)]
    pub overrides: Vec<StrategyOverride>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            write_conflict_files: true,
            assume_yes: false,
            overrides: Vec::new(),
        }
    }
}

/// Route files matching `pattern` to `strategy`.
///
/// `pattern` is an exact file name (`Makefile`), a path suffix
/// (`docs/CHANGELOG.md`), or an extension glob (`*.conf`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyOverride {
    pub pattern: String,
    pub strategy: MergeStrategy,
}

impl StrategyOverride {
    pub fn matches(&self, path: &Path) -> bool {
        if let Some(suffix) = self.pattern.strip_prefix("*.") {
            return path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(suffix));
        }
        path.ends_with(&self.pattern)
    }
}

fn default_level() -> String {
    "info".into()
}
fn default_true() -> bool {
    true
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
