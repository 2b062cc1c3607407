//! JSON-lines file backend: one file per city, one record per line.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::batch::BulkWriter;
use super::error::SinkError;
use crate::record::is_valid_city;

/// Appends records to `<dir>/<city>.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonLinesWriter {
    dir: PathBuf,
}

impl JsonLinesWriter {
    /// Create a writer for the given output directory.
    ///
    /// The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The file holding the records of `city`.
    pub fn path_for(&self, city: &str) -> Result<PathBuf, SinkError> {
        if !is_valid_city(city) {
            return Err(SinkError::InvalidCity(city.to_string()));
        }
        Ok(self.dir.join(format!("{city}.jsonl")))
    }
}

impl BulkWriter for JsonLinesWriter {
    fn write_bulk(
        &mut self,
        city: &str,
        documents: &[Map<String, Value>],
    ) -> Result<(), SinkError> {
        let path = self.path_for(city)?;
        let io_error = |source| SinkError::Io {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;
        let mut out = BufWriter::new(file);

        for document in documents {
            serde_json::to_writer(&mut out, document)?;
            out.write_all(b"\n").map_err(io_error)?;
        }
        out.flush().map_err(io_error)?;

        Ok(())
    }
}
