//! WAL Scanner
//!
//! Walks a log block by block, in file order, and records one outcome per
//! block.
//!
//! ## Per-block steps
//! ```text
//! read header ─► decode header ─► locate sections ─► read sections
//!      │               │                 │                 │
//!    EOF=Finished    bad=Aborted    outside block=Aborted  short=Aborted
//!
//! ─► verify checksum ─► decode payload ─► advance by total_block_size
//!        │                   │
//!     mismatch            failure
//!   (recorded, scan continues at the next block)
//! ```
//!
//! `total_block_size` is the only thing that locates the next block. Anything
//! that makes it untrustworthy ends the scan; anything that leaves it intact
//! is recorded against the block and the scan moves on.
//!
//! A corrupted `total_block_size` that still points inside the file is not
//! detectable here: it shows up as a malformed header at the wrong offset.

use std::fs::File;
use std::any::Any;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, WalCheckError};

use super::checksum::{Checksum, Crc32Checksum};
use super::header::{BlockHeader, HEADER_SIZE};
use super::payload::{BincodeBatchDecoder, PayloadDecoder};
use super::report::{BlockRecord, Section, Termination, ValidationOutcome, ValidationReport};

/// Where the scanner is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    Finished,
    Aborted,
    Stopped,
}

/// One block's bytes, held only while it is being validated
struct Block {
    header: BlockHeader,
    metadata: Vec<u8>,
    payload: Vec<u8>,
    offset: u64,
}

/// What a single step over the log produced
enum Step {
    EndOfLog,
    Advance(BlockRecord, u64),
    Abort(BlockRecord),
}

/// Sequential block scanner over a seekable log
///
/// Owns the reader exclusively; nothing else may move its position.
pub struct WalScanner<R> {
    reader: R,
    config: Config,
    checksum: Box<dyn Checksum>,
    decoder: Box<dyn PayloadDecoder>,
    /// Length of the log in bytes
    log_len: u64,
    /// Start of the next block to validate
    position: u64,
    /// Where the underlying reader currently is
    cursor: u64,
    state: ScanState,
    report: ValidationReport,
}

impl WalScanner<BufReader<File>> {
    /// Open a log file for validation
    pub fn open(path: &Path, config: Config) -> Result<Self> {
        // The buffer is sized from the config, so check it before allocating
        config.validate()?;
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(config.read_buffer_size, file);
        Self::from_reader(reader, config)
    }
}

impl<R: Read + Seek> WalScanner<R> {
    /// Scan an already-open log from its first byte
    pub fn from_reader(mut reader: R, config: Config) -> Result<Self> {
        config.validate()?;
        let log_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        Ok(Self {
            reader,
            config,
            checksum: Box::new(Crc32Checksum),
            decoder: Box::new(BincodeBatchDecoder),
            log_len,
            position: 0,
            cursor: 0,
            state: ScanState::Scanning,
            report: ValidationReport::new(),
        })
    }

    /// Replace the digest algorithm
    pub fn with_checksum(mut self, checksum: impl Checksum + 'static) -> Self {
        self.checksum = Box::new(checksum);
        self
    }

    /// Replace the payload decoder
    pub fn with_decoder(mut self, decoder: impl PayloadDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Offset of the next block to validate
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Outcomes recorded so far
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Validate the next block
    ///
    /// Returns `Ok(None)` once the scan has finished, aborted, or hit the
    /// block limit. A scan-fatal record is returned once and then the
    /// scanner stays aborted. Errors are environmental (read failures);
    /// they also leave the scanner aborted.
    pub fn next_block(&mut self) -> Result<Option<BlockRecord>> {
        if self.state != ScanState::Scanning {
            return Ok(None);
        }

        if let Some(max) = self.config.max_blocks {
            if self.report.entries.len() as u64 >= max {
                tracing::info!("Block limit of {} reached at offset {}", max, self.position);
                self.finish(ScanState::Stopped);
                return Ok(None);
            }
        }

        let step = match self.step() {
            Ok(step) => step,
            Err(e) => {
                tracing::error!("Read failed at offset {}: {}", self.position, e);
                self.finish(ScanState::Aborted);
                return Err(e);
            }
        };

        match step {
            Step::EndOfLog => {
                self.finish(ScanState::Finished);
                Ok(None)
            }
            Step::Advance(record, block_size) => {
                if record.outcome.is_valid() {
                    tracing::debug!(
                        "Validated block at offset {} ({} bytes): {}",
                        record.offset,
                        block_size,
                        record.outcome
                    );
                } else {
                    tracing::warn!("Block at offset {}: {}", record.offset, record.outcome);
                }

                self.position = record.offset + block_size;
                self.report.blocks_validated += 1;
                self.report.bytes_processed += block_size;
                self.report.entries.push(record.clone());
                Ok(Some(record))
            }
            Step::Abort(record) => {
                tracing::error!(
                    "Scan aborted at offset {}: {}",
                    record.offset,
                    record.outcome
                );
                self.report.entries.push(record.clone());
                self.finish(ScanState::Aborted);
                Ok(Some(record))
            }
        }
    }

    /// Scan to the end and return the report
    ///
    /// A read failure comes back as [`WalCheckError::ScanInterrupted`],
    /// carrying the aborted report up to the failing block.
    pub fn run(mut self) -> Result<ValidationReport> {
        loop {
            match self.next_block() {
                Ok(Some(_)) => {}
                Ok(None) => return Ok(self.into_report()),
                Err(e) => {
                    return Err(WalCheckError::ScanInterrupted {
                        report: Box::new(self.into_report()),
                        source: Box::new(e),
                    })
                }
            }
        }
    }

    /// Consume the scanner, keeping what was recorded
    ///
    /// A scan still in progress is reported as stopped.
    pub fn into_report(mut self) -> ValidationReport {
        if self.state == ScanState::Scanning {
            self.finish(ScanState::Stopped);
        }
        self.report
    }

    fn finish(&mut self, state: ScanState) {
        self.state = state;
        self.report.end_offset = self.position;
        self.report.termination = match state {
            ScanState::Aborted => Termination::Aborted,
            ScanState::Stopped => Termination::Stopped,
            ScanState::Finished | ScanState::Scanning => Termination::Finished,
        };

        if state != ScanState::Aborted {
            tracing::info!(
                "Scan {}: {} blocks, {} bytes, {} anomalies",
                self.report.termination,
                self.report.blocks_validated,
                self.report.bytes_processed,
                self.report.anomalies().count()
            );
        }
    }

    // =========================================================================
    // Block Steps
    // =========================================================================

    fn step(&mut self) -> Result<Step> {
        let offset = self.position;

        // Header
        let header_bytes = self.read_section(offset, HEADER_SIZE as u64)?;
        if header_bytes.is_empty() {
            return Ok(Step::EndOfLog);
        }
        if header_bytes.len() < HEADER_SIZE {
            return Ok(abort(
                offset,
                ValidationOutcome::TruncatedSection {
                    section: Section::Header,
                    expected_len: HEADER_SIZE as u64,
                    actual_len: header_bytes.len() as u64,
                },
            ));
        }

        let header = match BlockHeader::decode(&header_bytes) {
            Ok(header) => header,
            Err(reason) => {
                return Ok(abort(offset, ValidationOutcome::MalformedHeader { reason }))
            }
        };
        if let Err(reason) = header
            .check_declared_size()
            .and_then(|_| header.check_section_bounds())
        {
            return Ok(abort(offset, ValidationOutcome::MalformedHeader { reason }));
        }

        // Sections
        let metadata = match self.read_exact_section(
            offset,
            header.metadata_offset,
            u64::from(header.metadata_length),
            Section::Metadata,
        )? {
            Ok(bytes) => bytes,
            Err(truncated) => return Ok(abort(offset, truncated)),
        };
        let payload = match self.read_exact_section(
            offset,
            header.data_offset,
            header.data_length,
            Section::Payload,
        )? {
            Ok(bytes) => bytes,
            Err(truncated) => return Ok(abort(offset, truncated)),
        };

        // A block running past the end of the log is a torn write even when
        // both sections happened to fit.
        let available = self.log_len.saturating_sub(offset);
        if header.total_block_size > available {
            return Ok(abort(
                offset,
                ValidationOutcome::TruncatedSection {
                    section: Section::Block,
                    expected_len: header.total_block_size,
                    actual_len: available,
                },
            ));
        }

        let block = Block {
            header,
            metadata,
            payload,
            offset,
        };
        let outcome = self.verify(&block);

        Ok(Step::Advance(
            BlockRecord {
                offset: block.offset,
                outcome,
            },
            block.header.total_block_size,
        ))
    }

    /// Checksum and payload checks; neither can end the scan
    fn verify(&self, block: &Block) -> ValidationOutcome {
        if self.config.verify_checksums {
            let computed = self.checksum.compute(&block.metadata, &block.payload);
            if !self.checksum.verify(block.header.checksum, computed) {
                return ValidationOutcome::ChecksumMismatch {
                    expected: block.header.checksum,
                    computed,
                };
            }
        }

        if !self.config.decode_payloads {
            return ValidationOutcome::Valid {
                rows_parsed: 0,
                columns_parsed: 0,
            };
        }

        let decoded =
            panic::catch_unwind(AssertUnwindSafe(|| self.decoder.decode(&block.payload)));
        match decoded {
            Ok(Ok(shape)) => ValidationOutcome::Valid {
                rows_parsed: shape.rows,
                columns_parsed: shape.columns,
            },
            Ok(Err(e)) => ValidationOutcome::PayloadDecodeError { reason: e.reason },
            Err(cause) => ValidationOutcome::PayloadDecodeError {
                reason: format!("decoder panicked: {}", panic_message(cause.as_ref())),
            },
        }
    }

    // =========================================================================
    // I/O Helpers
    // =========================================================================

    /// Read a section at `relative_offset` from the block start, reporting a
    /// short read as a truncation outcome
    fn read_exact_section(
        &mut self,
        block_offset: u64,
        relative_offset: u64,
        len: u64,
        section: Section,
    ) -> Result<std::result::Result<Vec<u8>, ValidationOutcome>> {
        let bytes = match block_offset.checked_add(relative_offset) {
            Some(start) => self.read_section(start, len)?,
            None => Vec::new(),
        };

        if (bytes.len() as u64) < len {
            return Ok(Err(ValidationOutcome::TruncatedSection {
                section,
                expected_len: len,
                actual_len: bytes.len() as u64,
            }));
        }
        Ok(Ok(bytes))
    }

    /// Read up to `len` bytes at `start`; fewer only at end of log
    fn read_section(&mut self, start: u64, len: u64) -> Result<Vec<u8>> {
        if start >= self.log_len {
            return Ok(Vec::new());
        }

        if start != self.cursor {
            self.reader.seek(SeekFrom::Start(start))?;
            self.cursor = start;
        }

        // Never reserve more than the log can still supply
        let capacity = len.min(self.log_len - start);
        let mut buf = Vec::with_capacity(capacity as usize);
        let read = (&mut self.reader).take(len).read_to_end(&mut buf)?;
        self.cursor += read as u64;
        Ok(buf)
    }
}

impl<R: Read + Seek> Iterator for WalScanner<R> {
    type Item = Result<BlockRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

fn abort(offset: u64, outcome: ValidationOutcome) -> Step {
    Step::Abort(BlockRecord { offset, outcome })
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(msg) = cause.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = cause.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown cause"
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Validate a log file with the default configuration
pub fn validate(path: &Path) -> Result<ValidationReport> {
    validate_with(path, &Config::default())
}

/// Validate a log file
pub fn validate_with(path: &Path, config: &Config) -> Result<ValidationReport> {
    tracing::debug!("Validating {}", path.display());
    WalScanner::open(path, config.clone())?.run()
}

/// Validate several log files, one scanner per file on its own thread
///
/// Results come back in the order of `paths`.
pub fn validate_all<P: AsRef<Path>>(
    paths: &[P],
    config: &Config,
) -> Vec<(PathBuf, Result<ValidationReport>)> {
    let results = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                scope.spawn(move |_| validate_with(path, config))
            })
            .collect();

        handles
            .into_iter()
            .zip(paths)
            .map(|(handle, path)| {
                let path = path.as_ref().to_path_buf();
                let result = handle.join().unwrap_or_else(|_| {
                    Err(WalCheckError::Worker(format!(
                        "validation of {} panicked",
                        path.display()
                    )))
                });
                (path, result)
            })
            .collect::<Vec<_>>()
    });

    results.unwrap_or_default()
}
