//! commitsheet library
//!
//! This module exports the command line configuration and the report
//! pipeline for use in integration tests and as a library.

pub mod config;
pub mod report;

pub use report::{ReportStats, Reporter};
