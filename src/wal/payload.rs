//! Payload decoding
//!
//! Hands a block's payload section to a columnar decoder and reduces the
//! result to a row/column count. Decoder failures are values, not panics.

use std::fmt;

use crate::batch::ColumnarBatch;

/// Shape of a successfully decoded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchShape {
    pub rows: u64,
    pub columns: u64,
}

/// Payload bytes did not parse as a columnar batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecodeError {
    pub reason: String,
}

impl fmt::Display for PayloadDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for PayloadDecodeError {}

/// Decoder for a block's payload section
///
/// Implementations should report bad input as a [`PayloadDecodeError`].
/// The scanner also catches a panic raised by `decode` and records it
/// against the block, so a faulty decoder cannot end the scan.
pub trait PayloadDecoder: Send + Sync {
    fn decode(&self, payload: &[u8]) -> Result<BatchShape, PayloadDecodeError>;
}

/// Decodes payloads written as bincode-encoded [`ColumnarBatch`]es
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeBatchDecoder;

impl PayloadDecoder for BincodeBatchDecoder {
    fn decode(&self, payload: &[u8]) -> Result<BatchShape, PayloadDecodeError> {
        let batch = ColumnarBatch::deserialize(payload).map_err(|e| PayloadDecodeError {
            reason: e.to_string(),
        })?;

        Ok(BatchShape {
            rows: batch.num_rows() as u64,
            columns: batch.num_columns() as u64,
        })
    }
}
