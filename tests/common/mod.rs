//! Helpers for building WAL files in tests

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walcheck::wal::{BlockHeader, Checksum, Crc32Checksum, HEADER_SIZE};
use walcheck::{Column, ColumnValues, ColumnarBatch};

pub fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

/// Batch with an id, a reading, a label and a flag column
pub fn sample_batch(seed: i64, rows: usize) -> ColumnarBatch {
    let ids: Vec<i64> = (0..rows as i64).map(|i| seed * 1000 + i).collect();
    ColumnarBatch::try_new(vec![
        Column {
            name: "id".to_string(),
            values: ColumnValues::Int64(ids.clone()),
        },
        Column {
            name: "reading".to_string(),
            values: ColumnValues::Float64(ids.iter().map(|&i| i as f64 * 0.5).collect()),
        },
        Column {
            name: "label".to_string(),
            values: ColumnValues::Utf8(ids.iter().map(|i| format!("row-{}", i)).collect()),
        },
        Column {
            name: "even".to_string(),
            values: ColumnValues::Boolean(ids.iter().map(|i| i % 2 == 0).collect()),
        },
    ])
    .unwrap()
}

/// Header + metadata + payload, laid out contiguously with a CRC32 checksum
pub fn encode_raw_block(metadata: &[u8], payload: &[u8]) -> Vec<u8> {
    let checksum = Crc32Checksum.compute(metadata, payload);
    let header = BlockHeader::contiguous(metadata.len() as u16, payload.len() as u64, checksum);
    assemble(&header, metadata, payload)
}

/// A well-formed block carrying `batch`
pub fn encode_block(metadata: &[u8], batch: &ColumnarBatch) -> Vec<u8> {
    encode_raw_block(metadata, &batch.serialize().unwrap())
}

/// Write `header` followed by its sections at the offsets it declares,
/// zero-filling any gaps up to `total_block_size`
pub fn assemble(header: &BlockHeader, metadata: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut block = vec![0u8; header.total_block_size as usize];
    block[..HEADER_SIZE].copy_from_slice(&header.encode());

    let meta_at = header.metadata_offset as usize;
    block[meta_at..meta_at + metadata.len()].copy_from_slice(metadata);

    let data_at = header.data_offset as usize;
    block[data_at..data_at + payload.len()].copy_from_slice(payload);
    block
}

/// `count` well-formed blocks with varying row counts
pub fn sample_blocks(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let metadata = format!("{{\"wal\": \"block-{}\"}}", i);
            encode_block(metadata.as_bytes(), &sample_batch(i as i64, 3 + i))
        })
        .collect()
}

/// File offset at which each block starts
pub fn block_offsets(blocks: &[Vec<u8>]) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(blocks.len());
    let mut at = 0u64;
    for block in blocks {
        offsets.push(at);
        at += block.len() as u64;
    }
    offsets
}

pub fn write_log(path: &Path, blocks: &[Vec<u8>]) {
    let mut file = File::create(path).unwrap();
    for block in blocks {
        file.write_all(block).unwrap();
    }
    file.sync_all().unwrap();
}
