//! Validation report
//!
//! One [`BlockRecord`] per block the scanner reached, in file order, plus
//! totals and how the scan ended.

use std::fmt;

use super::header::HeaderDefect;

/// Section of a block that a read came up short on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Metadata,
    Payload,
    /// The whole block, as declared by `total_block_size`
    Block,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Header => write!(f, "header"),
            Section::Metadata => write!(f, "metadata"),
            Section::Payload => write!(f, "payload"),
            Section::Block => write!(f, "block"),
        }
    }
}

/// Result of validating one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Block passed every enabled check
    Valid { rows_parsed: u64, columns_parsed: u64 },

    /// Stored and recomputed digests differ
    ChecksumMismatch { expected: u32, computed: u32 },

    /// Header could not be trusted
    MalformedHeader { reason: HeaderDefect },

    /// Log ended inside a header or section
    TruncatedSection {
        section: Section,
        expected_len: u64,
        actual_len: u64,
    },

    /// Payload bytes are not a columnar batch
    PayloadDecodeError { reason: String },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid { .. })
    }

    /// Whether this outcome stops the scan
    ///
    /// Malformed headers and truncations leave no trustworthy
    /// `total_block_size`, so the next block cannot be located.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ValidationOutcome::MalformedHeader { .. } | ValidationOutcome::TruncatedSection { .. }
        )
    }

    /// Short name of the outcome kind
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationOutcome::Valid { .. } => "valid",
            ValidationOutcome::ChecksumMismatch { .. } => "checksum mismatch",
            ValidationOutcome::MalformedHeader { .. } => "malformed header",
            ValidationOutcome::TruncatedSection { .. } => "truncated section",
            ValidationOutcome::PayloadDecodeError { .. } => "payload decode error",
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Valid {
                rows_parsed,
                columns_parsed,
            } => write!(f, "valid ({} rows, {} columns)", rows_parsed, columns_parsed),
            ValidationOutcome::ChecksumMismatch { expected, computed } => write!(
                f,
                "checksum mismatch: expected {:#010x}, computed {:#010x}",
                expected, computed
            ),
            ValidationOutcome::MalformedHeader { reason } => match reason {
                HeaderDefect::DeclaredSizeTooSmall { declared, required } => write!(
                    f,
                    "malformed header: {} (declared {}, need at least {})",
                    reason, declared, required
                ),
                HeaderDefect::ShortRead { len } => {
                    write!(f, "malformed header: {} ({} bytes)", reason, len)
                }
                HeaderDefect::SectionOutsideBlock {
                    section,
                    offset,
                    length,
                    block_size,
                } => write!(
                    f,
                    "malformed header: {} ({} at {} + {} bytes, block is {} bytes)",
                    reason, section, offset, length, block_size
                ),
                HeaderDefect::MagicMismatch => write!(f, "malformed header: {}", reason),
            },
            ValidationOutcome::TruncatedSection {
                section,
                expected_len,
                actual_len,
            } => write!(
                f,
                "truncated {}: expected {} bytes, got {}",
                section, expected_len, actual_len
            ),
            ValidationOutcome::PayloadDecodeError { reason } => {
                write!(f, "payload decode error: {}", reason)
            }
        }
    }
}

/// Outcome of one block, keyed by the file offset where the block starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    pub offset: u64,
    pub outcome: ValidationOutcome,
}

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Clean end of log on a block boundary
    Finished,

    /// A scan-fatal anomaly; the rest of the log was not examined
    Aborted,

    /// Block limit reached before the end of the log
    Stopped,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Finished => write!(f, "FINISHED"),
            Termination::Aborted => write!(f, "ABORTED"),
            Termination::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Exit status for a clean log
pub const EXIT_CLEAN: i32 = 0;
/// Exit status when block-local anomalies were recorded
pub const EXIT_ANOMALIES: i32 = 1;
/// Exit status when the scan aborted
pub const EXIT_ABORTED: i32 = 2;
/// Exit status when the log could not be read at all
pub const EXIT_IO_ERROR: i32 = 3;

/// Aggregate result of scanning one log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Per-block outcomes in file order
    pub entries: Vec<BlockRecord>,

    /// Blocks whose boundaries were trusted and stepped over
    pub blocks_validated: u64,

    /// Sum of `total_block_size` over validated blocks
    pub bytes_processed: u64,

    /// File offset the scan stopped at
    pub end_offset: u64,

    pub termination: Termination,
}

impl ValidationReport {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            blocks_validated: 0,
            bytes_processed: 0,
            end_offset: 0,
            termination: Termination::Finished,
        }
    }

    /// Every non-valid record, in file order
    pub fn anomalies(&self) -> impl Iterator<Item = &BlockRecord> {
        self.entries.iter().filter(|r| !r.outcome.is_valid())
    }

    /// Number of blocks that passed every check
    pub fn valid_blocks(&self) -> u64 {
        self.entries.iter().filter(|r| r.outcome.is_valid()).count() as u64
    }

    /// Whether the scan did not abort and recorded no anomalies
    pub fn is_clean(&self) -> bool {
        self.termination != Termination::Aborted && self.anomalies().next().is_none()
    }

    /// Process exit status for this report
    pub fn exit_code(&self) -> i32 {
        if self.termination == Termination::Aborted {
            EXIT_ABORTED
        } else if self.is_clean() {
            EXIT_CLEAN
        } else {
            EXIT_ANOMALIES
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Validation Summary ---")?;
        writeln!(f, "Status: {}", self.termination)?;
        writeln!(f, "Total blocks validated: {}", self.blocks_validated)?;
        writeln!(f, "Total bytes processed: {} bytes", self.bytes_processed)?;
        writeln!(f, "Scan ended at offset: {}", self.end_offset)?;

        let anomalies: Vec<_> = self.anomalies().collect();
        if anomalies.is_empty() {
            writeln!(f, "Anomalies: none")?;
        } else {
            writeln!(f, "Anomalies: {}", anomalies.len())?;
            for record in anomalies {
                writeln!(f, "  offset {}: {}", record.offset, record.outcome)?;
            }
        }
        Ok(())
    }
}
