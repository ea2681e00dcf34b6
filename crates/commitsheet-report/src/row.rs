// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report row type
//!
//! A row describes one file touched by one commit, along with the commit's
//! metadata and its position in the report.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Column headers, in the order cells are written
pub const COLUMNS: [&str; 7] = [
    "#",
    "CommitId",
    "CommitDate",
    "AuthorName",
    "AuthorEmail",
    "FilePath",
    "Message",
];

/// Format used for the `CommitDate` cell
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M";

/// One (commit, changed file) row of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// 1-based position of the row in the report
    pub sequence: u32,
    /// Full commit SHA
    pub commit_id: String,
    /// Author date, in the author's own offset
    pub commit_date: DateTime<FixedOffset>,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Repository-relative path of the changed file
    pub file_path: String,
    /// Commit message with surrounding whitespace trimmed
    pub message: String,
}

impl ReportRow {
    /// Build a row, normalizing the commit message
    pub fn new(
        sequence: u32,
        commit_id: impl Into<String>,
        commit_date: DateTime<FixedOffset>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        file_path: impl Into<String>,
        message: Option<&str>,
    ) -> Self {
        Self {
            sequence,
            commit_id: commit_id.into(),
            commit_date,
            author_name: author_name.into(),
            author_email: author_email.into(),
            file_path: file_path.into(),
            message: normalize_message(message),
        }
    }

    /// The commit date as shown in the spreadsheet (`YYYY/MM/DD HH:MM`)
    #[must_use]
    pub fn formatted_date(&self) -> String {
        self.commit_date.format(DATE_FORMAT).to_string()
    }

    /// Text cells in column order, after the sequence number
    pub fn text_cells(&self) -> [String; 6] {
        [
            self.commit_id.clone(),
            self.formatted_date(),
            self.author_name.clone(),
            self.author_email.clone(),
            self.file_path.clone(),
            self.message.clone(),
        ]
    }
}

/// Missing messages become empty; present ones lose leading and trailing whitespace
#[must_use]
pub fn normalize_message(message: Option<&str>) -> String {
    message.map(str::trim).unwrap_or_default().to_string()
}
