// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The sink abstraction rows are written through

use std::path::Path;

use crate::error::ReportError;
use crate::row::ReportRow;

/// Destination for report rows
///
/// Rows arrive in report order through [`write`](ReportSink::write), which
/// never fails; problems surface once, from [`finalize`](ReportSink::finalize).
pub trait ReportSink {
    /// Append a row
    fn write(&mut self, row: &ReportRow);

    /// Persist everything written so far to `path`
    fn finalize(&mut self, path: &Path) -> Result<(), ReportError>;

    /// Number of rows accepted so far
    fn rows_written(&self) -> usize;
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn write(&mut self, row: &ReportRow) {
        (**self).write(row);
    }

    fn finalize(&mut self, path: &Path) -> Result<(), ReportError> {
        (**self).finalize(path)
    }

    fn rows_written(&self) -> usize {
        (**self).rows_written()
    }
}

/// Sink that keeps rows in memory and ignores `finalize`
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    rows: Vec<ReportRow>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows written so far
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Consume the sink, returning its rows
    pub fn into_rows(self) -> Vec<ReportRow> {
        self.rows
    }
}

impl ReportSink for MemorySink {
    fn write(&mut self, row: &ReportRow) {
        self.rows.push(row.clone());
    }

    fn finalize(&mut self, _path: &Path) -> Result<(), ReportError> {
        Ok(())
    }

    fn rows_written(&self) -> usize {
        self.rows.len()
    }
}
