//! Mapping file paths to merge strategies.

use std::path::Path;

use crate::types::MergeStrategy;

/// Picks the merge algorithm for a path. Injectable so callers can add
/// their own routing rules or stub selection in tests.
pub trait StrategySelector: Send + Sync {
    fn select_strategy(&self, path: &Path) -> MergeStrategy;
}

const TEXT_EXTENSIONS: &[&str] = &[
    "md", "txt", "toml", "cfg", "ini", "sh", "py", "go", "js", "ts", "css", "html", "xml", "rs",
    "rb", "java",
];

const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // executables and libraries
    "exe", "dll", "so", "dylib", "bin", "o", "a", "class", "wasm",
    // documents
    "pdf",
    // audio and video
    "mp3", "wav", "ogg", "flac", "mp4", "mov", "avi", "mkv", "webm",
];

/// The built-in routing rules. First match wins:
///
/// 1. `CLAUDE.md` → section merge, `.gitignore` → entry merge
/// 2. `.yaml`/`.yml` → YAML deep merge, `.json` → JSON merge
/// 3. known text extensions → line merge
/// 4. known binary extensions → overwrite
/// 5. anything else → overwrite, so unknown content is never text-merged
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSelector;

impl StrategySelector for DefaultSelector {
    fn select_strategy(&self, path: &Path) -> MergeStrategy {
        match path.file_name().and_then(|n| n.to_str()) {
            Some("CLAUDE.md") => return MergeStrategy::SectionMerge,
            Some(".gitignore") => return MergeStrategy::EntryMerge,
            _ => {}
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml" | "yml") => MergeStrategy::YamlDeep,
            Some("json") => MergeStrategy::JsonMerge,
            Some(e) if TEXT_EXTENSIONS.contains(&e) => MergeStrategy::LineMerge,
            Some(e) if BINARY_EXTENSIONS.contains(&e) => MergeStrategy::Overwrite,
            _ => {
                tracing::debug!(path = %path.display(), "unrecognized file type, overwriting");
                MergeStrategy::Overwrite
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(path: &str) -> MergeStrategy {
        DefaultSelector.select_strategy(Path::new(path))
    }

    #[test]
    fn test_exact_names_win() {
        assert_eq!(select("CLAUDE.md"), MergeStrategy::SectionMerge);
        assert_eq!(select("docs/CLAUDE.md"), MergeStrategy::SectionMerge);
        assert_eq!(select(".gitignore"), MergeStrategy::EntryMerge);
        assert_eq!(select("sub/.gitignore"), MergeStrategy::EntryMerge);
        assert_eq!(select("claude.md"), MergeStrategy::LineMerge);
    }

    #[test]
    fn test_structured_extensions() {
        assert_eq!(select("ci.yml"), MergeStrategy::YamlDeep);
        assert_eq!(select(".github/workflows/build.YAML"), MergeStrategy::YamlDeep);
        assert_eq!(select("settings.json"), MergeStrategy::JsonMerge);
    }

    #[test]
    fn test_text_and_binary() {
        assert_eq!(select("README.md"), MergeStrategy::LineMerge);
        assert_eq!(select("src/main.rs"), MergeStrategy::LineMerge);
        assert_eq!(select("Cargo.toml"), MergeStrategy::LineMerge);
        assert_eq!(select("logo.png"), MergeStrategy::Overwrite);
        assert_eq!(select("dist.tar.gz"), MergeStrategy::Overwrite);
    }

    #[test]
    fn test_unknown_defaults_to_overwrite() {
        assert_eq!(select("Makefile"), MergeStrategy::Overwrite);
        assert_eq!(select("data.parquet"), MergeStrategy::Overwrite);
    }
}
