//! # merge-engine
//!
//! Three-way merging of project template files: reconciles the template a
//! project started from (**base**), the user's customized copy (**current**),
//! and a newly released template (**updated**) into one result that keeps
//! user edits, absorbs template improvements, and reports whatever cannot be
//! reconciled automatically.
//!
//! ## Strategies
//!
//! The engine picks a strategy per file from its path:
//!
//! 1. **Section merge**: `CLAUDE.md`; whole Markdown sections under level-2
//!    and level-3 headings are merged as units.
//! 2. **Entry merge**: `.gitignore`; lines are a set, user deletions stick.
//! 3. **YAML / JSON deep merge**: documents are parsed into one generic
//!    value tree and merged key by key, recursing into nested mappings.
//! 4. **Line merge**: known text formats; a diff3-style merge over a
//!    Myers line diff.
//! 5. **Overwrite**: binary and unknown files take the template verbatim.
//!
//! Divergent edits never fail a merge. They come back as [`Conflict`]s next
//! to a complete best-effort result, and can be rendered as Git-style
//! markers with [`format_conflict_markers`] or written to a sibling
//! `.conflict` file with [`write_conflict_file`].
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//! use std::sync::atomic::AtomicBool;
//! use merge_engine::{MergeEngine, MergeStrategy};
//!
//! let engine = MergeEngine::new();
//! let result = engine
//!     .merge_file(
//!         &AtomicBool::new(false),
//!         Path::new(".gitignore"),
//!         b"*.pyc\n.env\n",
//!         b"*.pyc\n.env\nmy_file\n",
//!         b"*.pyc\n.env\n.cache/\n",
//!     )
//!     .unwrap();
//!
//! assert_eq!(result.strategy, MergeStrategy::EntryMerge);
//! assert!(!result.has_conflict());
//! assert_eq!(result.content_lossy(), "*.pyc\n.env\nmy_file\n.cache/\n");
//! ```

pub mod conflict;
pub mod diff;
pub mod engine;
pub mod entry;
pub mod error;
pub mod line;
pub mod merger;
pub mod overwrite;
pub mod section;
pub mod strategy;
pub mod structured;
pub mod types;
pub mod value;

// Re-export primary public API
pub use conflict::{conflict_path, format_conflict_markers, write_conflict_file};
pub use diff::{diff_lines, unified_diff};
pub use engine::MergeEngine;
pub use error::MergeError;
pub use merger::{Merger, MergerRegistry};
pub use strategy::{DefaultSelector, StrategySelector};
pub use structured::deep_merge_map;
pub use types::{Conflict, Edit, EditOp, MergeResult, MergeScenario, MergeStrategy, Side};
pub use value::{DocumentFormat, Mapping, Scalar, Value};
