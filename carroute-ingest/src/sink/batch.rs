//! Per-city batching of output records.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::error::SinkError;
use crate::record::CityRecord;

/// Default number of buffered records that triggers a flush.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// A storage backend that accepts one bulk write per city collection.
pub trait BulkWriter {
    /// Write `documents` to the collection for `city`, in order.
    fn write_bulk(&mut self, city: &str, documents: &[Map<String, Value>])
    -> Result<(), SinkError>;
}

impl<W: BulkWriter + ?Sized> BulkWriter for &mut W {
    fn write_bulk(
        &mut self,
        city: &str,
        documents: &[Map<String, Value>],
    ) -> Result<(), SinkError> {
        (**self).write_bulk(city, documents)
    }
}

/// Buffers records per city and hands them to a [`BulkWriter`] in bulk.
///
/// A flush is triggered once the total number of buffered records, over
/// all cities, reaches the batch size.
#[derive(Debug)]
pub struct CityBatch<W> {
    writer: W,
    batch_size: usize,
    pending: BTreeMap<String, Vec<Map<String, Value>>>,
    size: usize,
}

impl<W: BulkWriter> CityBatch<W> {
    /// Create a batch that flushes every `batch_size` records.
    ///
    /// A batch size of zero is treated as one.
    pub fn new(writer: W, batch_size: usize) -> Self {
        Self {
            writer,
            batch_size: batch_size.max(1),
            pending: BTreeMap::new(),
            size: 0,
        }
    }

    /// Buffer a record, flushing everything if the batch is full.
    ///
    /// Returns the number of records written by that flush, if any.
    pub fn insert(&mut self, record: CityRecord) -> Result<usize, SinkError> {
        self.pending
            .entry(record.city)
            .or_default()
            .push(record.document);
        self.size += 1;
        debug!(buffered = self.size, "Record buffered");

        if self.size >= self.batch_size {
            return self.flush();
        }
        Ok(0)
    }

    /// Write every buffered city as one bulk and empty the buffer.
    ///
    /// Returns the number of records written. On failure the cities
    /// already written are dropped from the buffer and the failing city
    /// stays buffered.
    pub fn flush(&mut self) -> Result<usize, SinkError> {
        let mut written = 0;

        while let Some((city, documents)) = self.pending.pop_first() {
            if let Err(e) = self.writer.write_bulk(&city, &documents) {
                self.pending.insert(city, documents);
                return Err(e);
            }
            self.size -= documents.len();
            written += documents.len();
            info!(city = %city, records = documents.len(), "Inserted bulk");
        }

        Ok(written)
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}
