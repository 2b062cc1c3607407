//! Output side: per-city batching and the storage backends.
//!
//! Records are grouped by city and written one bulk per city, either when
//! enough records are buffered or when the input ends.

mod batch;
mod error;
mod jsonl;

pub use batch::{BulkWriter, CityBatch, DEFAULT_BATCH_SIZE};
pub use error::SinkError;
pub use jsonl::JsonLinesWriter;

#[cfg(test)]
pub(crate) use batch::memory::MemoryWriter;
