//! Block header codec
//!
//! Encodes and decodes the fixed 63-byte header that starts every block.
//! Every multi-byte field is little-endian.

use std::fmt;

use super::report::Section;

/// Magic bytes identifying the start of a block
pub const MAGIC: &[u8; 8] = b"WALBLOCK";

/// Header size: fixed by the format, see the layout table in [`crate::wal`]
pub const HEADER_SIZE: usize = 63;

// Field offsets within the header
const MAGIC_AT: usize = 0;
const METADATA_OFFSET_AT: usize = 8;
const METADATA_LENGTH_AT: usize = 16;
const CHECKSUM_AT: usize = 18;
const RESERVE_OFFSET_AT: usize = 22;
const RESERVE_LENGTH_AT: usize = 30;
const DATA_OFFSET_AT: usize = 38;
const DATA_LENGTH_AT: usize = 46;
const TOTAL_BLOCK_SIZE_AT: usize = 54;
const PADDING_AT: usize = 62;

/// Decoded block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub magic: [u8; 8],
    /// Offset of the metadata section, relative to block start
    pub metadata_offset: u64,
    pub metadata_length: u16,
    /// Digest over metadata ∥ payload
    pub checksum: u32,
    /// Reserved by the writer, never interpreted
    pub reserve_offset: u64,
    /// Reserved by the writer, never interpreted
    pub reserve_length: u64,
    /// Offset of the payload section, relative to block start
    pub data_offset: u64,
    pub data_length: u64,
    /// Bytes from this block's start to the next block's start
    pub total_block_size: u64,
    /// Alignment filler
    pub padding: u8,
}

/// Why a header was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDefect {
    /// First 8 bytes are not [`MAGIC`]
    MagicMismatch,

    /// Fewer than [`HEADER_SIZE`] bytes were supplied
    ShortRead { len: usize },

    /// `total_block_size` cannot hold the header plus both sections
    DeclaredSizeTooSmall { declared: u64, required: u64 },

    /// A section starts inside the header or ends past `total_block_size`
    SectionOutsideBlock {
        section: Section,
        offset: u64,
        length: u64,
        block_size: u64,
    },
}

impl fmt::Display for HeaderDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderDefect::MagicMismatch => write!(f, "magic mismatch"),
            HeaderDefect::ShortRead { .. } => write!(f, "short read"),
            HeaderDefect::DeclaredSizeTooSmall { .. } => write!(f, "declared size too small"),
            HeaderDefect::SectionOutsideBlock { .. } => write!(f, "section outside block"),
        }
    }
}

impl BlockHeader {
    /// Build a header for a block laid out as header, metadata, payload with
    /// no gaps. Reserved fields and padding are zeroed.
    pub fn contiguous(metadata_length: u16, data_length: u64, checksum: u32) -> Self {
        let metadata_offset = HEADER_SIZE as u64;
        let data_offset = metadata_offset + u64::from(metadata_length);
        Self {
            magic: *MAGIC,
            metadata_offset,
            metadata_length,
            checksum,
            reserve_offset: data_offset,
            reserve_length: 0,
            data_offset,
            data_length,
            total_block_size: data_offset + data_length,
            padding: 0,
        }
    }

    /// Smallest `total_block_size` consistent with the declared section lengths
    pub fn required_size(&self) -> u64 {
        (HEADER_SIZE as u64)
            .saturating_add(u64::from(self.metadata_length))
            .saturating_add(self.data_length)
    }

    /// Check that `total_block_size` covers the header and both sections
    pub fn check_declared_size(&self) -> Result<(), HeaderDefect> {
        let required = self.required_size();
        if self.total_block_size < required {
            return Err(HeaderDefect::DeclaredSizeTooSmall {
                declared: self.total_block_size,
                required,
            });
        }
        Ok(())
    }

    /// Check that metadata and payload both lie between the end of the
    /// header and `total_block_size`
    pub fn check_section_bounds(&self) -> Result<(), HeaderDefect> {
        let sections = [
            (
                Section::Metadata,
                self.metadata_offset,
                u64::from(self.metadata_length),
            ),
            (Section::Payload, self.data_offset, self.data_length),
        ];

        for (section, offset, length) in sections {
            let in_block = offset >= HEADER_SIZE as u64
                && offset
                    .checked_add(length)
                    .map_or(false, |end| end <= self.total_block_size);
            if !in_block {
                return Err(HeaderDefect::SectionOutsideBlock {
                    section,
                    offset,
                    length,
                    block_size: self.total_block_size,
                });
            }
        }
        Ok(())
    }

    /// Encode to the on-disk layout
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[MAGIC_AT..METADATA_OFFSET_AT].copy_from_slice(&self.magic);
        buf[METADATA_OFFSET_AT..METADATA_LENGTH_AT]
            .copy_from_slice(&self.metadata_offset.to_le_bytes());
        buf[METADATA_LENGTH_AT..CHECKSUM_AT].copy_from_slice(&self.metadata_length.to_le_bytes());
        buf[CHECKSUM_AT..RESERVE_OFFSET_AT].copy_from_slice(&self.checksum.to_le_bytes());
        buf[RESERVE_OFFSET_AT..RESERVE_LENGTH_AT]
            .copy_from_slice(&self.reserve_offset.to_le_bytes());
        buf[RESERVE_LENGTH_AT..DATA_OFFSET_AT].copy_from_slice(&self.reserve_length.to_le_bytes());
        buf[DATA_OFFSET_AT..DATA_LENGTH_AT].copy_from_slice(&self.data_offset.to_le_bytes());
        buf[DATA_LENGTH_AT..TOTAL_BLOCK_SIZE_AT].copy_from_slice(&self.data_length.to_le_bytes());
        buf[TOTAL_BLOCK_SIZE_AT..PADDING_AT].copy_from_slice(&self.total_block_size.to_le_bytes());
        buf[PADDING_AT] = self.padding;
        buf
    }

    /// Decode from the on-disk layout
    ///
    /// Only the first [`HEADER_SIZE`] bytes are read; undersized input is
    /// rejected rather than read out of bounds.
    pub fn decode(bytes: &[u8]) -> Result<Self, HeaderDefect> {
        if bytes.len() < HEADER_SIZE {
            return Err(HeaderDefect::ShortRead { len: bytes.len() });
        }

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[MAGIC_AT..METADATA_OFFSET_AT]);
        if &magic != MAGIC {
            return Err(HeaderDefect::MagicMismatch);
        }

        Ok(Self {
            magic,
            metadata_offset: read_u64(bytes, METADATA_OFFSET_AT),
            metadata_length: u16::from_le_bytes([
                bytes[METADATA_LENGTH_AT],
                bytes[METADATA_LENGTH_AT + 1],
            ]),
            checksum: u32::from_le_bytes([
                bytes[CHECKSUM_AT],
                bytes[CHECKSUM_AT + 1],
                bytes[CHECKSUM_AT + 2],
                bytes[CHECKSUM_AT + 3],
            ]),
            reserve_offset: read_u64(bytes, RESERVE_OFFSET_AT),
            reserve_length: read_u64(bytes, RESERVE_LENGTH_AT),
            data_offset: read_u64(bytes, DATA_OFFSET_AT),
            data_length: read_u64(bytes, DATA_LENGTH_AT),
            total_block_size: read_u64(bytes, TOTAL_BLOCK_SIZE_AT),
            padding: bytes[PADDING_AT],
        })
    }
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut field = [0u8; 8];
    field.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(field)
}
