//! # walcheck
//!
//! Offline validator for block-structured write-ahead logs:
//! - Byte-exact block header decoding
//! - CRC32 integrity checks over each block's metadata and payload
//! - Columnar payload decoding
//! - A report that separates scan-fatal damage from block-local corruption
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       WalScanner                            │
//! │        (owns the file, walks blocks in file order)          │
//! └──────┬──────────────────┬──────────────────┬────────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//! ┌─────────────┐   ┌───────────────┐   ┌────────────────┐
//! │ BlockHeader │   │   Checksum    │   │ PayloadDecoder │
//! │   (codec)   │   │   (CRC32)     │   │ (ColumnarBatch)│
//! └─────────────┘   └───────────────┘   └────────────────┘
//!        │                  │                  │
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!                 ┌───────────────────┐
//!                 │ ValidationReport  │
//!                 └───────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod batch;
pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{WalCheckError, Result};
pub use config::Config;
pub use batch::{Column, ColumnValues, ColumnarBatch};
pub use wal::{validate, validate_all, validate_with, ValidationReport, WalScanner};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of walcheck
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
