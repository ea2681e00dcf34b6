// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! commitsheet-report: Report rows and the sinks that persist them
//!
//! One [`ReportRow`] is produced per (commit, changed file) pair. A
//! [`ReportSink`] accepts rows in order and writes them out once at the end.
//!
//! # Example
//!
//! ```no_run
//! use chrono::DateTime;
//! use commitsheet_report::{ExcelSink, ReportRow, ReportSink};
//!
//! let mut sink = ExcelSink::new();
//! let date = DateTime::parse_from_rfc3339("2026-01-17T02:33:06+00:00").unwrap();
//! sink.write(&ReportRow::new(
//!     1,
//!     "0123456789abcdef0123456789abcdef01234567",
//!     date,
//!     "Jane Doe",
//!     "jane@example.com",
//!     "src/main.rs",
//!     Some("Initial commit\n"),
//! ));
//! sink.finalize(std::path::Path::new("commits.xlsx")).unwrap();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod excel;
pub mod json;
pub mod row;
pub mod sink;

pub use error::ReportError;
pub use excel::{ExcelSink, MAX_SHEET_ROWS};
pub use json::JsonSink;
pub use row::{COLUMNS, DATE_FORMAT, ReportRow, normalize_message};
pub use sink::{MemorySink, ReportSink};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ReportError;
    pub use crate::excel::ExcelSink;
    pub use crate::json::JsonSink;
    pub use crate::row::ReportRow;
    pub use crate::sink::ReportSink;
}
