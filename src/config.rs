//! Configuration for walcheck
//!
//! Centralized scan configuration with sensible defaults.

use crate::error::{Result, WalCheckError};

/// Largest accepted read buffer (64 MB)
pub const MAX_READ_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Main configuration for a validation scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Verification Steps
    // -------------------------------------------------------------------------
    /// Recompute and compare each block's checksum
    pub verify_checksums: bool,

    /// Decode each block's columnar payload
    pub decode_payloads: bool,

    // -------------------------------------------------------------------------
    // Scan Limits
    // -------------------------------------------------------------------------
    /// Stop after this many blocks (None = scan to end of log)
    pub max_blocks: Option<u64>,

    // -------------------------------------------------------------------------
    // I/O Configuration
    // -------------------------------------------------------------------------
    /// Capacity of the buffered reader wrapped around the log file (in bytes)
    pub read_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            decode_payloads: true,
            max_blocks: None,
            read_buffer_size: 64 * 1024, // 64 KB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings that would make a scan meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_blocks == Some(0) {
            return Err(WalCheckError::Config(
                "max_blocks must be at least 1".to_string(),
            ));
        }
        if self.read_buffer_size == 0 {
            return Err(WalCheckError::Config(
                "read_buffer_size must be non-zero".to_string(),
            ));
        }
        if self.read_buffer_size > MAX_READ_BUFFER_SIZE {
            return Err(WalCheckError::Config(format!(
                "read_buffer_size {} exceeds the maximum of {} bytes",
                self.read_buffer_size, MAX_READ_BUFFER_SIZE
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Enable or disable checksum verification
    pub fn verify_checksums(mut self, enabled: bool) -> Self {
        self.config.verify_checksums = enabled;
        self
    }

    /// Enable or disable payload decoding
    pub fn decode_payloads(mut self, enabled: bool) -> Self {
        self.config.decode_payloads = enabled;
        self
    }

    /// Stop the scan after `count` blocks
    pub fn max_blocks(mut self, count: u64) -> Self {
        self.config.max_blocks = Some(count);
        self
    }

    /// Set the read buffer capacity (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
