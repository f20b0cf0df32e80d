//! Tests for columnar batches and payload decoding
//!
//! These tests verify:
//! - Batch serialization round-trip and shape
//! - Rejection of ragged, truncated and padded payloads
//! - Decoder failures surface as values

use walcheck::wal::{BatchShape, BincodeBatchDecoder, PayloadDecoder};
use walcheck::{Column, ColumnValues, ColumnarBatch, WalCheckError};

use crate::common::sample_batch;

// =============================================================================
// ColumnarBatch Tests
// =============================================================================

#[test]
fn test_batch_round_trip() {
    let batch = sample_batch(7, 5);

    let bytes = batch.serialize().unwrap();
    let recovered = ColumnarBatch::deserialize(&bytes).unwrap();

    assert_eq!(recovered, batch);
    assert_eq!(recovered.num_rows(), 5);
    assert_eq!(recovered.num_columns(), 4);
}

#[test]
fn test_empty_batch() {
    let batch = ColumnarBatch::default();
    let recovered = ColumnarBatch::deserialize(&batch.serialize().unwrap()).unwrap();

    assert_eq!(recovered.num_rows(), 0);
    assert_eq!(recovered.num_columns(), 0);
}

#[test]
fn test_ragged_batch_rejected_on_construction() {
    let result = ColumnarBatch::try_new(vec![
        Column {
            name: "a".to_string(),
            values: ColumnValues::Int64(vec![1, 2]),
        },
        Column {
            name: "b".to_string(),
            values: ColumnValues::Boolean(vec![true, false, true]),
        },
    ]);

    assert!(matches!(result, Err(WalCheckError::Serialization(_))));
}

#[test]
fn test_ragged_batch_rejected_on_decode() {
    let ragged = ColumnarBatch {
        columns: vec![
            Column {
                name: "a".to_string(),
                values: ColumnValues::Int64(vec![1, 2]),
            },
            Column {
                name: "b".to_string(),
                values: ColumnValues::Utf8(vec!["x".to_string()]),
            },
        ],
    };
    let bytes = ragged.serialize().unwrap();

    match ColumnarBatch::deserialize(&bytes) {
        Err(WalCheckError::Serialization(msg)) => assert!(msg.contains("ragged")),
        other => panic!("Expected ragged batch error, got {:?}", other),
    }
}

#[test]
fn test_truncated_payload_rejected() {
    let bytes = sample_batch(1, 4).serialize().unwrap();
    assert!(ColumnarBatch::deserialize(&bytes[..bytes.len() - 3]).is_err());
}

#[test]
fn test_trailing_bytes_rejected() {
    let mut bytes = sample_batch(1, 4).serialize().unwrap();
    bytes.push(0);
    assert!(ColumnarBatch::deserialize(&bytes).is_err());
}

#[test]
fn test_huge_length_prefix_rejected() {
    // Column count of u64::MAX followed by almost nothing
    let mut bytes = u64::MAX.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0u8; 8]);

    assert!(ColumnarBatch::deserialize(&bytes).is_err());
}

// =============================================================================
// Decoder Tests
// =============================================================================

#[test]
fn test_decoder_reports_shape() {
    let bytes = sample_batch(3, 12).serialize().unwrap();

    let shape = BincodeBatchDecoder.decode(&bytes).unwrap();
    assert_eq!(shape, BatchShape { rows: 12, columns: 4 });
}

#[test]
fn test_decoder_error_is_value() {
    let err = BincodeBatchDecoder.decode(b"definitely not a batch").unwrap_err();
    assert!(!err.reason.is_empty());
}

#[test]
fn test_decoder_empty_payload() {
    assert!(BincodeBatchDecoder.decode(&[]).is_err());
}
