//! Error types for walcheck
//!
//! Format anomalies found inside a log are not errors: they are recorded as
//! [`ValidationOutcome`](crate::wal::ValidationOutcome) values in the report.
//! This type covers failures of the environment around the scan.

use thiserror::Error;

use crate::wal::ValidationReport;

/// Result type alias using WalCheckError
pub type Result<T> = std::result::Result<T, WalCheckError>;

/// Unified error type for walcheck operations
#[derive(Debug, Error)]
pub enum WalCheckError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A read failed part way through a log; `report` holds every block
    /// validated before the failure
    #[error("Scan interrupted: {source}")]
    ScanInterrupted {
        report: Box<ValidationReport>,
        #[source]
        source: Box<WalCheckError>,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Worker failed: {0}")]
    Worker(String),
}

impl From<bincode::Error> for WalCheckError {
    fn from(err: bincode::Error) -> Self {
        WalCheckError::Serialization(err.to_string())
    }
}
