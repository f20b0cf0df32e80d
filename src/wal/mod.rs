//! Write-Ahead Log (WAL) Module
//!
//! Read-side validation of block-structured logs.
//!
//! ## Responsibilities
//! - Decode fixed-size block headers
//! - CRC32 checksums for corruption detection
//! - Columnar payload decoding
//! - Sequential scan with a per-block validation report
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ Block 1                                          │
//! │ ┌──────────────┬──────────────┬────────────────┐ │
//! │ │ Header (63)  │ Metadata     │ Payload        │ │
//! │ └──────────────┴──────────────┴────────────────┘ │
//! ├──────────────────────────────────────────────────┤
//! │ Block 2 (starts at Block 1 + total_block_size)   │
//! │ ...                                              │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Header Layout (little-endian)
//! ```text
//! offset  size  field
//!      0     8  magic "WALBLOCK"
//!      8     8  metadata_offset   (relative to block start)
//!     16     2  metadata_length
//!     18     4  checksum          (CRC32 of metadata ∥ payload)
//!     22     8  reserve_offset    (unused)
//!     30     8  reserve_length    (unused)
//!     38     8  data_offset       (relative to block start)
//!     46     8  data_length
//!     54     8  total_block_size
//!     62     1  padding
//! ```

mod checksum;
mod header;
mod payload;
mod report;
mod scanner;

pub use checksum::{Checksum, Crc32Checksum};
pub use header::{BlockHeader, HeaderDefect, HEADER_SIZE, MAGIC};
pub use payload::{BatchShape, BincodeBatchDecoder, PayloadDecodeError, PayloadDecoder};
pub use report::{
    BlockRecord, Section, Termination, ValidationOutcome, ValidationReport, EXIT_ABORTED,
    EXIT_ANOMALIES, EXIT_CLEAN, EXIT_IO_ERROR,
};
pub use scanner::{validate, validate_all, validate_with, ScanState, WalScanner};
