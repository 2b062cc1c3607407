//! Ingestion configuration.

use std::path::PathBuf;

use crate::sink::DEFAULT_BATCH_SIZE;

/// Default output directory for the JSON-lines files.
pub const DEFAULT_OUTPUT_DIR: &str = "carroute-out";

/// Default number of log lines reconstructed in parallel at once.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Configuration for an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Directory receiving one `<city>.jsonl` file per city.
    pub output_dir: PathBuf,

    /// Number of buffered records that triggers a bulk write.
    pub batch_size: usize,

    /// Number of log lines handed to the worker pool at once.
    /// Larger chunks keep more cores busy but delay the first writes.
    pub chunk_size: usize,
}

impl IngestConfig {
    /// Create a config writing to `output_dir`, with default sizes.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the bulk size. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the parallel chunk size. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}
