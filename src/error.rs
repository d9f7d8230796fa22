//! Error types for data loading and ledger storage.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading the exported weapon and cost data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures reading or writing persisted values.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The background autoplay worker is no longer running.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("autoplay worker has shut down")]
    Closed,
}
