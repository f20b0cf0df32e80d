//! Tests for report rendering and exit statuses

use walcheck::wal::{
    BlockRecord, HeaderDefect, Section, Termination, ValidationOutcome, ValidationReport,
    EXIT_ABORTED, EXIT_ANOMALIES, EXIT_CLEAN,
};

fn report(termination: Termination, outcomes: Vec<(u64, ValidationOutcome)>) -> ValidationReport {
    let entries: Vec<BlockRecord> = outcomes
        .into_iter()
        .map(|(offset, outcome)| BlockRecord { offset, outcome })
        .collect();
    let blocks_validated = entries.iter().filter(|r| !r.outcome.is_fatal()).count() as u64;

    ValidationReport {
        entries,
        blocks_validated,
        bytes_processed: blocks_validated * 100,
        end_offset: blocks_validated * 100,
        termination,
    }
}

fn valid() -> ValidationOutcome {
    ValidationOutcome::Valid {
        rows_parsed: 3,
        columns_parsed: 2,
    }
}

#[test]
fn test_clean_report() {
    let report = report(Termination::Finished, vec![(0, valid()), (100, valid())]);

    assert!(report.is_clean());
    assert_eq!(report.exit_code(), EXIT_CLEAN);
    assert_eq!(report.valid_blocks(), 2);
    assert_eq!(report.anomalies().count(), 0);
}

#[test]
fn test_block_local_anomaly_report() {
    let report = report(
        Termination::Finished,
        vec![
            (0, valid()),
            (
                100,
                ValidationOutcome::ChecksumMismatch {
                    expected: 1,
                    computed: 2,
                },
            ),
            (200, valid()),
        ],
    );

    assert!(!report.is_clean());
    assert_eq!(report.exit_code(), EXIT_ANOMALIES);
    assert_eq!(report.valid_blocks(), 2);
    assert_eq!(report.anomalies().next().unwrap().offset, 100);
}

#[test]
fn test_aborted_report() {
    let report = report(
        Termination::Aborted,
        vec![
            (0, valid()),
            (
                100,
                ValidationOutcome::MalformedHeader {
                    reason: HeaderDefect::MagicMismatch,
                },
            ),
        ],
    );

    assert_eq!(report.exit_code(), EXIT_ABORTED);
}

#[test]
fn test_stopped_report_without_anomalies_is_clean() {
    let report = report(Termination::Stopped, vec![(0, valid())]);
    assert_eq!(report.exit_code(), EXIT_CLEAN);
}

#[test]
fn test_fatal_classification() {
    assert!(ValidationOutcome::TruncatedSection {
        section: Section::Header,
        expected_len: 63,
        actual_len: 1,
    }
    .is_fatal());
    assert!(ValidationOutcome::MalformedHeader {
        reason: HeaderDefect::MagicMismatch
    }
    .is_fatal());
    assert!(!ValidationOutcome::ChecksumMismatch {
        expected: 0,
        computed: 1
    }
    .is_fatal());
    assert!(!ValidationOutcome::PayloadDecodeError {
        reason: "bad".to_string()
    }
    .is_fatal());
    assert!(!valid().is_fatal());
}

#[test]
fn test_display_summary() {
    let report = report(
        Termination::Aborted,
        vec![
            (0, valid()),
            (
                100,
                ValidationOutcome::PayloadDecodeError {
                    reason: "io error: unexpected end of file".to_string(),
                },
            ),
            (
                200,
                ValidationOutcome::TruncatedSection {
                    section: Section::Payload,
                    expected_len: 500,
                    actual_len: 20,
                },
            ),
        ],
    );
    let text = report.to_string();

    assert!(text.contains("Status: ABORTED"));
    assert!(text.contains("Total blocks validated: 2"));
    assert!(text.contains("Total bytes processed: 200 bytes"));
    assert!(text.contains("Anomalies: 2"));
    assert!(text.contains("offset 100: payload decode error: io error: unexpected end of file"));
    assert!(text.contains("offset 200: truncated payload: expected 500 bytes, got 20"));
}

#[test]
fn test_display_outcome_details() {
    let mismatch = ValidationOutcome::ChecksumMismatch {
        expected: 0xCBF4_3926,
        computed: 0x1,
    };
    assert_eq!(
        mismatch.to_string(),
        "checksum mismatch: expected 0xcbf43926, computed 0x00000001"
    );

    let too_small = ValidationOutcome::MalformedHeader {
        reason: HeaderDefect::DeclaredSizeTooSmall {
            declared: 10,
            required: 80,
        },
    };
    assert_eq!(
        too_small.to_string(),
        "malformed header: declared size too small (declared 10, need at least 80)"
    );
    assert_eq!(too_small.kind(), "malformed header");

    let outside = ValidationOutcome::MalformedHeader {
        reason: HeaderDefect::SectionOutsideBlock {
            section: Section::Payload,
            offset: 70,
            length: 40,
            block_size: 100,
        },
    };
    assert_eq!(
        outside.to_string(),
        "malformed header: section outside block (payload at 70 + 40 bytes, block is 100 bytes)"
    );
}
