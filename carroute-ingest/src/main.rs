use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use carroute_ingest::config::{DEFAULT_CHUNK_SIZE, DEFAULT_OUTPUT_DIR, IngestConfig};
use carroute_ingest::ingest::{IngestError, Pipeline, Summary};
use carroute_ingest::sink::{DEFAULT_BATCH_SIZE, JsonLinesWriter};

/// Reconstruct car routes from routing access logs and store them per city.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log files to read; standard input when none are given.
    files: Vec<PathBuf>,

    /// Directory receiving one `<city>.jsonl` file per city.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    out: PathBuf,

    /// Number of buffered records that triggers a write.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Number of lines reconstructed in parallel at once.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

fn run(args: &Args) -> Result<Summary, IngestError> {
    let config = IngestConfig::new(&args.out)
        .with_batch_size(args.batch_size)
        .with_chunk_size(args.chunk_size);

    let mut pipeline = Pipeline::new(JsonLinesWriter::new(&config.output_dir), &config);

    let result = if args.files.is_empty() {
        pipeline.consume("<stdin>", std::io::stdin().lock())
    } else {
        args.files.iter().try_for_each(|path| {
            let name = path.display().to_string();
            let file = File::open(path).map_err(|source| IngestError::Read {
                name: name.clone(),
                source,
            })?;
            pipeline.consume(&name, BufReader::new(file))
        })
    };

    // Records read before a failure are still written out.
    let summary = pipeline.finish()?;
    result.map(|()| summary)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(summary) => {
            println!("Lines seen:      {}", summary.lines_seen);
            println!("Lines skipped:   {}", summary.lines_skipped);
            println!("Lines dropped:   {}", summary.lines_dropped);
            println!("Records written: {}", summary.records_written);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Ingestion failed");
            ExitCode::FAILURE
        }
    }
}
