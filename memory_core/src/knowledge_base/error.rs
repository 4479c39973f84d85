//! Error types for the fact store.

use std::path::PathBuf;

/// Errors produced by fact store operations.
///
/// Malformed log lines are not errors; they are skipped at load time.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("memory log I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode fact: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for fact store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
