use std::path::PathBuf;

use thiserror::Error;

use crate::types::{MergeStrategy, Side};
use crate::value::DocumentFormat;

/// Errors raised by the merge engine.
///
/// Divergent edits are not errors: they are reported as
/// [`Conflict`](crate::types::Conflict)s inside a successful result.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to parse {side} as {format}: {message}")]
    Parse {
        side: Side,
        format: DocumentFormat,
        message: String,
    },

    #[error("failed to serialize merged {format} document: {message}")]
    Serialize {
        format: DocumentFormat,
        message: String,
    },

    #[error("unsupported merge strategy: {0}")]
    UnsupportedStrategy(MergeStrategy),

    #[error("no conflicts to write")]
    NoConflicts,

    #[error("merge of {} cancelled", path.display())]
    Cancelled { path: PathBuf },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
