// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Spreadsheet sink
//!
//! Rows are written below the header rows of the first sheet of a workbook.
//! The workbook is either built in (a single "Commits" header row) or loaded
//! once from a user-supplied `.xlsx` template, whose used rows are kept as
//! the header.

use std::path::{Path, PathBuf};

use tracing::{Span, debug, error, info, info_span, warn};
use umya_spreadsheet::Spreadsheet;

use crate::error::ReportError;
use crate::row::{COLUMNS, ReportRow};
use crate::sink::ReportSink;

/// Index of the sheet rows are written to
pub const DEFAULT_SHEET_NO: usize = 0;

/// Name of the sheet in the built-in workbook
pub const DEFAULT_SHEET_NAME: &str = "Commits";

/// Last row an `.xlsx` worksheet can hold
pub const MAX_SHEET_ROWS: u32 = 1_048_576;

/// Writes report rows into an `.xlsx` workbook
///
/// Rows past [`MAX_SHEET_ROWS`] are dropped with a warning.
pub struct ExcelSink {
    /// `None` when the template could not be loaded
    workbook: Option<Spreadsheet>,
    template: Option<PathBuf>,
    /// Last row written (1-based); starts at the last reserved header row
    current_row: u32,
    row_limit: u32,
    rows_written: usize,
    rows_dropped: usize,
    span: Span,
}

impl ExcelSink {
    /// Create a sink backed by the built-in workbook
    pub fn new() -> Self {
        let mut workbook = umya_spreadsheet::new_file();
        if let Some(sheet) = workbook.get_sheet_mut(&DEFAULT_SHEET_NO) {
            sheet.set_name(DEFAULT_SHEET_NAME);
            for (col, title) in (1u32..).zip(COLUMNS) {
                sheet.get_cell_mut((col, 1)).set_value_string(title);
            }
        }

        Self {
            workbook: Some(workbook),
            template: None,
            current_row: 1,
            row_limit: MAX_SHEET_ROWS,
            rows_written: 0,
            rows_dropped: 0,
            span: info_span!("excel_sink"),
        }
    }

    /// Create a sink from an existing `.xlsx` template
    ///
    /// The template is read once. Rows already used on its first sheet are
    /// treated as the header. If it cannot be read the error is logged and
    /// the sink drops every row; [`write_file`](Self::write_file) then
    /// returns [`ReportError::TemplateUnavailable`].
    pub fn with_template(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let span = info_span!("excel_sink", template = %path.display());
        let entered = span.enter();

        let loaded = umya_spreadsheet::reader::xlsx::read(path)
            .map_err(|e| e.to_string())
            .and_then(|workbook| {
                let reserved = workbook
                    .get_sheet(&DEFAULT_SHEET_NO)
                    .map(|sheet| sheet.get_highest_row());
                match reserved {
                    Some(reserved) => Ok((workbook, reserved)),
                    None => Err("template has no worksheet".to_string()),
                }
            });

        let (workbook, current_row) = match loaded {
            Ok((workbook, reserved)) => {
                info!(header_rows = reserved, "Loaded template");
                (Some(workbook), reserved)
            }
            Err(e) => {
                error!(error = %e, "Could not create the spreadsheet sink from template");
                (None, 0)
            }
        };
        drop(entered);

        Self {
            workbook,
            template: Some(path.to_path_buf()),
            current_row,
            row_limit: MAX_SHEET_ROWS,
            rows_written: 0,
            rows_dropped: 0,
            span,
        }
    }

    /// Whether the sink has a workbook to write into
    pub fn is_ready(&self) -> bool {
        self.workbook.is_some()
    }

    /// Rows dropped because the sheet was full
    pub fn rows_dropped(&self) -> usize {
        self.rows_dropped
    }

    /// Row number the next data row will be written to
    pub fn next_row(&self) -> u32 {
        self.current_row + 1
    }

    /// Serialize the workbook to `path`
    ///
    /// The workbook is kept, so this may be called again with another path.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        let _entered = self.span.enter();

        let Some(workbook) = &self.workbook else {
            let template = self
                .template
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            error!(output = %path.display(), "No workbook to write, template was unavailable");
            return Err(ReportError::TemplateUnavailable { path: template });
        };

        umya_spreadsheet::writer::xlsx::write(workbook, path).map_err(|e| {
            error!(output = %path.display(), error = %e, "Could not write spreadsheet");
            ReportError::Spreadsheet {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;

        if self.rows_dropped > 0 {
            warn!(
                output = %path.display(),
                dropped = self.rows_dropped,
                "Spreadsheet is incomplete, sheet row limit reached"
            );
        }
        info!(output = %path.display(), rows = self.rows_written, "Wrote spreadsheet");
        Ok(())
    }
}

impl Default for ExcelSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for ExcelSink {
    fn write(&mut self, row: &ReportRow) {
        let Some(sheet) = self
            .workbook
            .as_mut()
            .and_then(|w| w.get_sheet_mut(&DEFAULT_SHEET_NO))
        else {
            debug!(parent: &self.span, sequence = row.sequence, "Dropping row, no workbook");
            return;
        };

        if self.current_row >= self.row_limit {
            if self.rows_dropped == 0 {
                warn!(
                    parent: &self.span,
                    limit = self.row_limit,
                    sequence = row.sequence,
                    "Sheet is full, dropping further rows"
                );
            }
            self.rows_dropped += 1;
            return;
        }

        self.current_row += 1;
        let r = self.current_row;
        sheet.get_cell_mut((1, r)).set_value_number(row.sequence);
        for (col, value) in (2u32..).zip(row.text_cells()) {
            sheet.get_cell_mut((col, r)).set_value_string(value);
        }
        self.rows_written += 1;
    }

    fn finalize(&mut self, path: &Path) -> Result<(), ReportError> {
        self.write_file(path)
    }

    fn rows_written(&self) -> usize {
        self.rows_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use similar_asserts::assert_eq;

    fn row(sequence: u32, path: &str, message: Option<&str>) -> ReportRow {
        ReportRow::new(
            sequence,
            format!("{:040x}", sequence),
            DateTime::parse_from_rfc3339("2026-01-17T02:33:06+02:00").expect("date"),
            "Jane Doe",
            "jane@example.com",
            path,
            message,
        )
    }

    /// All cell values of the first sheet, row by row
    fn read_back(path: &Path) -> Vec<Vec<String>> {
        let workbook = umya_spreadsheet::reader::xlsx::read(path).expect("read workbook");
        let sheet = workbook.get_sheet(&DEFAULT_SHEET_NO).expect("first sheet");
        (1..=sheet.get_highest_row())
            .map(|r| {
                (1..=COLUMNS.len() as u32)
                    .map(|c| sheet.get_value((c, r)))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_rows_past_sheet_limit_are_dropped() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = dir.path().join("full.xlsx");

        let mut sink = ExcelSink::new();
        sink.row_limit = 3;
        for sequence in 1..=4 {
            sink.write(&row(sequence, "a.txt", None));
        }
        assert_eq!(sink.rows_written(), 2);
        assert_eq!(sink.rows_dropped(), 2);
        assert_eq!(sink.next_row(), 4);
        sink.finalize(&out).expect("write");

        let cells = read_back(&out);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[2][0], "2");
    }

    #[test]
    fn test_default_row_limit() {
        let sink = ExcelSink::new();
        assert_eq!(sink.row_limit, MAX_SHEET_ROWS);
        assert_eq!(sink.rows_dropped(), 0);
    }

    #[test]
    fn test_builtin_header() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = dir.path().join("empty.xlsx");

        let mut sink = ExcelSink::new();
        assert!(sink.is_ready());
        assert_eq!(sink.next_row(), 2);
        sink.finalize(&out).expect("write");

        let cells = read_back(&out);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0], COLUMNS.map(String::from).to_vec());

        let workbook = umya_spreadsheet::reader::xlsx::read(&out).expect("read");
        assert_eq!(
            workbook.get_sheet(&DEFAULT_SHEET_NO).expect("sheet").get_name(),
            DEFAULT_SHEET_NAME
        );
    }

    #[test]
    fn test_rows_follow_header_in_column_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = dir.path().join("rows.xlsx");

        let mut sink = ExcelSink::new();
        sink.write(&row(1, "a.txt", Some("  First\n")));
        sink.write(&row(2, "b.txt", None));
        assert_eq!(sink.rows_written(), 2);
        sink.finalize(&out).expect("write");

        let cells = read_back(&out);
        assert_eq!(cells.len(), 3);
        assert_eq!(
            cells[1],
            vec![
                "1".to_string(),
                format!("{:040x}", 1),
                "2026/01/17 02:33".to_string(),
                "Jane Doe".to_string(),
                "jane@example.com".to_string(),
                "a.txt".to_string(),
                "First".to_string(),
            ]
        );
        assert_eq!(cells[2][0], "2");
        assert_eq!(cells[2][5], "b.txt");
        assert_eq!(cells[2][6], "");
    }

    #[test]
    fn test_numeric_looking_text_stays_text() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = dir.path().join("text.xlsx");

        let mut sink = ExcelSink::new();
        sink.write(&row(1, "2024", Some("0042")));
        sink.finalize(&out).expect("write");

        let cells = read_back(&out);
        assert_eq!(cells[1][5], "2024");
        assert_eq!(cells[1][6], "0042");
    }

    #[test]
    fn test_write_file_twice_gives_identical_content() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = dir.path().join("first.xlsx");
        let second = dir.path().join("second.xlsx");

        let mut sink = ExcelSink::new();
        for (i, path) in ["a.txt", "b.txt", "c.txt"].iter().enumerate() {
            sink.write(&row(i as u32 + 1, path, Some("msg")));
        }
        sink.write_file(&first).expect("first write");
        sink.write_file(&second).expect("second write");

        assert_eq!(read_back(&first), read_back(&second));
    }

    #[test]
    fn test_failed_write_keeps_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let bad = dir.path().join("missing").join("dir").join("out.xlsx");
        let good = dir.path().join("out.xlsx");

        let mut sink = ExcelSink::new();
        sink.write(&row(1, "a.txt", Some("msg")));

        let err = sink.finalize(&bad).expect_err("parent directory is missing");
        assert!(matches!(err, ReportError::Spreadsheet { .. }));

        sink.finalize(&good).expect("write to good path");
        assert_eq!(read_back(&good)[1][5], "a.txt");
    }

    #[test]
    fn test_template_rows_are_reserved() {
        let dir = tempfile::tempdir().expect("temp dir");
        let template = dir.path().join("template.xlsx");
        let out = dir.path().join("out.xlsx");

        let mut workbook = umya_spreadsheet::new_file();
        {
            let sheet = workbook.get_sheet_mut(&0).expect("sheet");
            sheet.get_cell_mut((1, 1)).set_value_string("Quarterly commits");
            sheet.get_cell_mut((1, 2)).set_value_string("Generated report");
            for (col, title) in (1u32..).zip(COLUMNS) {
                sheet.get_cell_mut((col, 3)).set_value_string(title);
            }
        }
        umya_spreadsheet::writer::xlsx::write(&workbook, &template).expect("write template");

        let mut sink = ExcelSink::with_template(&template);
        assert!(sink.is_ready());
        assert_eq!(sink.next_row(), 4);
        sink.write(&row(1, "a.txt", Some("msg")));
        sink.finalize(&out).expect("write");

        let cells = read_back(&out);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0][0], "Quarterly commits");
        assert_eq!(cells[2], COLUMNS.map(String::from).to_vec());
        assert_eq!(cells[3][0], "1");
        assert_eq!(cells[3][5], "a.txt");

        // The template itself is untouched
        assert_eq!(read_back(&template).len(), 3);
    }

    #[test]
    fn test_missing_template_drops_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let template = dir.path().join("does-not-exist.xlsx");
        let out = dir.path().join("out.xlsx");

        let mut sink = ExcelSink::with_template(&template);
        assert!(!sink.is_ready());

        sink.write(&row(1, "a.txt", None));
        assert_eq!(sink.rows_written(), 0);

        let err = sink.finalize(&out).expect_err("template unavailable");
        assert!(matches!(err, ReportError::TemplateUnavailable { .. }));
        assert!(!out.exists());
    }
}
