//! Access-log ingestion.
//!
//! The routing frontend logs one line per request, with the request line
//! and the response body as a (possibly escaped) JSON object. Car routing
//! lines are picked out, reconstructed in parallel chunk by chunk, and fed
//! in input order to the per-city batch.

use std::io::BufRead;
use std::time::Instant;

use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::IngestConfig;
use crate::record::{CityRecord, RecordError, build_city_record};
use crate::sink::{BulkWriter, CityBatch, SinkError};

/// Marker of a car routing request line.
const REQUEST_MARKER: &str = "POST /carrouting/3";

/// Marker of a response that carries a route.
const RESPONSE_MARKER: &str = "driving_direction";

/// Why a single log line was dropped.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("dangling escape at byte {0}")]
    DanglingEscape(usize),

    #[error("invalid \\x escape at byte {0}")]
    InvalidHexEscape(usize),

    #[error("unescaped line is not UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Errors that abort an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to write records: {0}")]
    Sink(#[from] SinkError),
}

/// Counters of an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Every line read.
    pub lines_seen: usize,
    /// Lines that are not car routing responses.
    pub lines_skipped: usize,
    /// Car routing lines that failed and were dropped.
    pub lines_dropped: usize,
    /// Records handed to the writer.
    pub records_written: usize,
}

/// Whether a log line is a car routing response with a route.
pub fn is_carrouting_line(line: &str) -> bool {
    line.contains(REQUEST_MARKER) && line.contains(RESPONSE_MARKER)
}

/// Undo the escaping applied by the log writer.
///
/// Handles `\\`, `\"`, `\'`, `\n`, `\r`, `\t` and `\xHH`; any other escape
/// is kept as-is.
pub fn unescape_line(line: &str) -> Result<String, LineError> {
    let bytes = line.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let Some(&escaped) = bytes.get(i + 1) else {
            return Err(LineError::DanglingEscape(i));
        };
        match escaped {
            b'\\' | b'"' | b'\'' => out.push(escaped),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'x' => {
                let value = bytes
                    .get(i + 2..i + 4)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                    .ok_or(LineError::InvalidHexEscape(i))?;
                out.push(value);
                i += 2;
            }
            other => out.extend_from_slice(&[b'\\', other]),
        }
        i += 2;
    }

    Ok(String::from_utf8(out)?)
}

/// Parse a log line into a JSON value, unescaping it first unless it is
/// already valid JSON.
pub fn parse_line(line: &str) -> Result<Value, LineError> {
    match serde_json::from_str(line) {
        Ok(value) => Ok(value),
        Err(_) => Ok(serde_json::from_str(&unescape_line(line)?)?),
    }
}

/// Turn one car routing log line into its output record.
pub fn process_line(line: &str) -> Result<CityRecord, LineError> {
    Ok(build_city_record(parse_line(line)?)?)
}

/// Reads log lines and writes the resulting records through a batch.
#[derive(Debug)]
pub struct Pipeline<W> {
    batch: CityBatch<W>,
    chunk_size: usize,
    summary: Summary,
}

impl<W: BulkWriter> Pipeline<W> {
    pub fn new(writer: W, config: &IngestConfig) -> Self {
        Self {
            batch: CityBatch::new(writer, config.batch_size),
            chunk_size: config.chunk_size.max(1),
            summary: Summary::default(),
        }
    }

    /// Process a chunk of lines.
    ///
    /// Reconstruction runs in parallel; records reach the batch in input
    /// order. A failing line is logged and dropped, a failing write aborts.
    pub fn process_chunk(&mut self, lines: &[String]) -> Result<(), IngestError> {
        let start = Instant::now();
        let first_line = self.summary.lines_seen + 1;

        let results: Vec<Option<Result<CityRecord, LineError>>> = lines
            .par_iter()
            .map(|line| is_carrouting_line(line).then(|| process_line(line)))
            .collect();

        self.summary.lines_seen += lines.len();
        let mut records = 0;

        for (offset, (line, result)) in lines.iter().zip(results).enumerate() {
            match result {
                None => self.summary.lines_skipped += 1,
                Some(Ok(record)) => {
                    records += 1;
                    self.summary.records_written += self.batch.insert(record)?;
                }
                Some(Err(e)) => {
                    self.summary.lines_dropped += 1;
                    error!(line = first_line + offset, error = %e, "Dropping car routing line");
                    debug!(line = first_line + offset, content = %line, "Dropped line content");
                }
            }
        }

        debug!(
            lines = lines.len(),
            records,
            elapsed = ?start.elapsed(),
            "Chunk processed"
        );
        Ok(())
    }

    /// Process every line of `reader`, chunk by chunk.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    /// `name` identifies the input in errors and logs.
    pub fn consume<R: BufRead>(&mut self, name: &str, reader: R) -> Result<(), IngestError> {
        info!(input = name, "Reading log lines");
        let mut chunk = Vec::with_capacity(self.chunk_size);

        for line in reader.split(b'\n') {
            let line = line.map_err(|source| IngestError::Read {
                name: name.to_string(),
                source,
            })?;
            let line = String::from_utf8_lossy(&line);
            chunk.push(line.trim_end_matches('\r').to_string());

            if chunk.len() >= self.chunk_size {
                self.process_chunk(&chunk)?;
                chunk.clear();
            }
        }

        if !chunk.is_empty() {
            self.process_chunk(&chunk)?;
        }
        Ok(())
    }

    /// Write out whatever is still buffered and return the run counters.
    pub fn finish(&mut self) -> Result<Summary, IngestError> {
        self.summary.records_written += self.batch.flush()?;
        info!(
            lines = self.summary.lines_seen,
            written = self.summary.records_written,
            dropped = self.summary.lines_dropped,
            "Ingestion finished"
        );
        Ok(self.summary)
    }

    pub fn writer(&self) -> &W {
        self.batch.writer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemoryWriter;
    use serde_json::json;

    fn response_line(city: &str) -> String {
        json!({
            "request": format!("POST /carrouting/3.0.0/{city}/ HTTP/1.1"),
            "response_body": {
                "result": [{
                    "route_id": format!("{city}-1"),
                    "driving_direction": {
                        "type": "carrouting", "id": "dd", "rule": "jam",
                        "subroutes": [{
                            "distance": 1000, "duration": 100, "id": 0,
                            "start_point": {"id": 1, "part": 0, "seconds": 0},
                            "finish_point": {"id": 2, "part": 1, "seconds": 100},
                            "edges": [[{
                                "id": 1, "begin_part": 0, "end_part": 1, "length": 1000,
                                "shape_id": 1, "geometry": ["37.6 55.7", "37.61 55.7"]
                            }]]
                        }],
                        "items": [{
                            "id": 0, "distance": 1000, "duration": 100, "subroute": 0,
                            "edges": [{"id": 1}],
                            "instruction": {"id": 0, "type": "begin", "names": []}
                        }]
                    }
                }]
            }
        })
        .to_string()
    }

    #[test]
    fn filters_car_routing_lines() {
        assert!(is_carrouting_line(&response_line("moscow")));
        assert!(!is_carrouting_line(
            "{\"request\": \"POST /carrouting/3.0.0/moscow/ HTTP/1.1\"}"
        ));
        assert!(!is_carrouting_line(
            "{\"request\": \"POST /ctx/2.0 HTTP/1.1\", \"driving_direction\": 1}"
        ));
    }

    #[test]
    fn unescapes_log_escapes() {
        assert_eq!(
            unescape_line(r#"{\x22a\x22: \x22b\\c\x22}"#).unwrap(),
            r#"{"a": "b\c"}"#
        );
        assert_eq!(unescape_line(r"a\tb\nc\'d").unwrap(), "a\tb\nc'd");
        assert_eq!(unescape_line(r"keep \q").unwrap(), r"keep \q");
    }

    #[test]
    fn unescape_decodes_utf8_sequences() {
        assert_eq!(unescape_line(r"\xd0\x9c").unwrap(), "М");
    }

    #[test]
    fn unescape_rejects_broken_escapes() {
        assert!(matches!(
            unescape_line("abc\\"),
            Err(LineError::DanglingEscape(3))
        ));
        assert!(matches!(
            unescape_line(r"a\xZZ"),
            Err(LineError::InvalidHexEscape(1))
        ));
        assert!(matches!(
            unescape_line(r"a\x+f"),
            Err(LineError::InvalidHexEscape(1))
        ));
        assert!(matches!(
            unescape_line(r"\xff"),
            Err(LineError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn escaped_line_round_trips() {
        let raw = response_line("kazan");
        let escaped = raw.replace('"', r"\x22");

        let parsed = parse_line(&escaped).unwrap();
        assert_eq!(parsed, serde_json::from_str::<Value>(&raw).unwrap());
    }

    #[test]
    fn valid_json_is_not_unescaped() {
        let line = r#"{"request": "a \"quoted\\n\" word"}"#;
        let parsed = parse_line(line).unwrap();
        assert_eq!(parsed["request"], "a \"quoted\\n\" word");
    }

    #[test]
    fn pipeline_counts_and_writes_in_order() {
        let config = IngestConfig::default().with_batch_size(2).with_chunk_size(2);
        let mut pipeline = Pipeline::new(MemoryWriter::default(), &config);

        let lines = vec![
            response_line("moscow"),
            "127.0.0.1 GET /health".to_string(),
            response_line("spb"),
            // Car routing line with a broken response.
            "POST /carrouting/3.0.0/moscow/ driving_direction {".to_string(),
            response_line("moscow"),
        ];
        let input = lines.join("\n");

        pipeline.consume("test", input.as_bytes()).unwrap();
        let summary = pipeline.finish().unwrap();

        assert_eq!(
            summary,
            Summary {
                lines_seen: 5,
                lines_skipped: 1,
                lines_dropped: 1,
                records_written: 3,
            }
        );
        let writer = pipeline.writer();
        assert_eq!(writer.records("moscow"), 2);
        assert_eq!(writer.records("spb"), 1);
        assert_eq!(writer.bulks[0].1[0]["route_id"], "moscow-1");
    }

    #[test]
    fn sink_failure_aborts() {
        let writer = MemoryWriter {
            fail_city: Some("spb".into()),
            ..Default::default()
        };
        let config = IngestConfig::default().with_batch_size(1);
        let mut pipeline = Pipeline::new(writer, &config);

        let err = pipeline
            .consume("test", response_line("spb").as_bytes())
            .unwrap_err();
        assert!(matches!(err, IngestError::Sink(SinkError::InvalidCity(_))));
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let config = IngestConfig::default();
        let mut pipeline = Pipeline::new(MemoryWriter::default(), &config);
        let input = format!("{}\r\n", response_line("moscow"));

        pipeline.consume("test", input.as_bytes()).unwrap();
        assert_eq!(pipeline.finish().unwrap().records_written, 1);
    }

    #[test]
    fn escaped_log_to_city_files() {
        use crate::sink::JsonLinesWriter;
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let config = IngestConfig::new(dir.path());
        let mut pipeline = Pipeline::new(JsonLinesWriter::new(&config.output_dir), &config);

        let input = [
            response_line("moscow").replace('"', r"\x22"),
            response_line("spb"),
            response_line("moscow"),
        ]
        .join("\n");
        pipeline.consume("access.log", input.as_bytes()).unwrap();
        assert_eq!(pipeline.finish().unwrap().records_written, 3);

        let moscow = std::fs::read_to_string(dir.path().join("moscow.jsonl")).unwrap();
        let docs: Vec<Value> = moscow
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["geometry"], "LINESTRING(37.6 55.7,37.61 55.7)");
        assert_eq!(docs[0]["average_speed"], 36);
        assert!(dir.path().join("spb.jsonl").exists());
    }

    #[test]
    fn unusable_city_drops_only_its_line() {
        use crate::sink::JsonLinesWriter;
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let config = IngestConfig::new(dir.path()).with_batch_size(1);
        let mut pipeline = Pipeline::new(JsonLinesWriter::new(&config.output_dir), &config);

        let input = [
            response_line("moscow").replace("/moscow/ HTTP", "/moscow?key=abc HTTP"),
            response_line("mos.cow"),
            response_line("moscow"),
        ]
        .join("\n");
        pipeline.consume("access.log", input.as_bytes()).unwrap();
        let summary = pipeline.finish().unwrap();

        assert_eq!(summary.lines_dropped, 1);
        assert_eq!(summary.records_written, 2);
        let moscow = std::fs::read_to_string(dir.path().join("moscow.jsonl")).unwrap();
        assert_eq!(moscow.lines().count(), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn error_display() {
        let err = IngestError::Read {
            name: "access.log".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read access.log: gone");
        assert_eq!(
            LineError::InvalidHexEscape(4).to_string(),
            "invalid \\x escape at byte 4"
        );
    }
}
