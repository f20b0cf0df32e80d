//! WAL component tests
//!
//! One test binary with a file per component.

#[path = "../common/mod.rs"]
mod common;

mod payload_tests;
mod report_tests;
