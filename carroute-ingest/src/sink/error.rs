//! Sink error types.

use std::path::PathBuf;

/// Errors that can occur when writing output records.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Reading or writing an output file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A record could not be serialized
    #[error("failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),

    /// A city name that cannot be used as a collection name
    #[error("invalid city name {0:?}")]
    InvalidCity(String),
}
