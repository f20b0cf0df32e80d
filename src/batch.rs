//! Columnar batches
//!
//! The table fragment carried in a block's payload section. Producers ship
//! these over the bulk-transfer channel; the validator only needs to
//! deserialize them and count rows and columns.
//!
//! ## Encoding
//! bincode with fixed-width integers. Trailing bytes are rejected, and reads
//! are bounded by the input length so a damaged length prefix fails fast
//! instead of allocating.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalCheckError};

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

/// Column storage, one vector per supported type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValues {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
    Boolean(Vec<bool>),
}

impl ColumnValues {
    /// Number of values in the column
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Float64(v) => v.len(),
            ColumnValues::Utf8(v) => v.len(),
            ColumnValues::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A batch of rows stored column by column
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnarBatch {
    pub columns: Vec<Column>,
}

impl ColumnarBatch {
    /// Create a batch, rejecting columns of unequal length
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        let batch = Self { columns };
        batch.check_rectangular()?;
        Ok(batch)
    }

    /// Number of rows (0 for a batch without columns)
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Serialize to payload bytes
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(codec().serialize(self)?)
    }

    /// Deserialize from payload bytes
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let batch: Self = codec().with_limit(bytes.len() as u64).deserialize(bytes)?;
        batch.check_rectangular()?;
        Ok(batch)
    }

    fn check_rectangular(&self) -> Result<()> {
        let rows = self.num_rows();
        if let Some(column) = self.columns.iter().find(|c| c.values.len() != rows) {
            return Err(WalCheckError::Serialization(format!(
                "ragged batch: column '{}' has {} rows, expected {}",
                column.name,
                column.values.len(),
                rows
            )));
        }
        Ok(())
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}
