//! Block checksums
//!
//! The digest covers the metadata bytes followed by the payload bytes and is
//! stored in the header's 4-byte checksum field.

/// Digest algorithm used to verify block contents
pub trait Checksum: Send + Sync {
    /// Digest over `metadata ∥ payload`
    fn compute(&self, metadata: &[u8], payload: &[u8]) -> u32;

    /// Compare a stored digest with a computed one
    fn verify(&self, stored: u32, computed: u32) -> bool {
        stored == computed
    }
}

/// CRC-32 (IEEE), the log writer's algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Checksum;

impl Checksum for Crc32Checksum {
    fn compute(&self, metadata: &[u8], payload: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(metadata);
        hasher.update(payload);
        hasher.finalize()
    }
}
