//! walcheck CLI
//!
//! Validates one or more WAL files and prints a report per file.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use walcheck::wal::EXIT_IO_ERROR;
use walcheck::{Config, WalCheckError};

/// walcheck
#[derive(Parser, Debug)]
#[command(name = "walcheck")]
#[command(about = "Validate WALBLOCK write-ahead log files")]
#[command(version)]
struct Args {
    /// WAL files to validate
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Stop after this many blocks per file
    #[arg(short, long)]
    max_blocks: Option<u64>,

    /// Do not verify block checksums
    #[arg(long)]
    skip_checksum: bool,

    /// Do not decode block payloads
    #[arg(long)]
    skip_decode: bool,

    /// Read buffer size in KB
    #[arg(short, long, default_value = "64")]
    buffer_kb: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,walcheck=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("walcheck v{}", walcheck::VERSION);

    let buffer_size = match args.buffer_kb.checked_mul(1024) {
        Some(size) => size,
        None => {
            eprintln!("error: --buffer-kb {} is too large", args.buffer_kb);
            process::exit(EXIT_IO_ERROR);
        }
    };

    // Build config from args
    let mut builder = Config::builder()
        .verify_checksums(!args.skip_checksum)
        .decode_payloads(!args.skip_decode)
        .read_buffer_size(buffer_size);
    if let Some(max) = args.max_blocks {
        builder = builder.max_blocks(max);
    }
    let config = builder.build();

    if let Err(e) = config.validate() {
        eprintln!("error: {}", e);
        process::exit(EXIT_IO_ERROR);
    }

    let mut status = 0;
    for (path, result) in walcheck::validate_all(&args.paths, &config) {
        println!("== {}", path.display());
        match result {
            Ok(report) => {
                print!("{}", report);
                status = status.max(report.exit_code());
            }
            Err(WalCheckError::ScanInterrupted { report, source }) => {
                print!("{}", report);
                println!("error: {}", source);
                tracing::error!("Validation of {} interrupted: {}", path.display(), source);
                status = status.max(EXIT_IO_ERROR);
            }
            Err(e) => {
                println!("error: {}", e);
                tracing::error!("Failed to validate {}: {}", path.display(), e);
                status = status.max(EXIT_IO_ERROR);
            }
        }
    }

    process::exit(status);
}
