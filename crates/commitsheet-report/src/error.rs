// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for report sinks

use thiserror::Error;

/// Errors that can occur while persisting a report
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error while writing the output file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The spreadsheet could not be written
    #[error("Could not write spreadsheet {path}: {message}")]
    Spreadsheet {
        /// Output path
        path: String,
        /// Underlying writer error
        message: String,
    },

    /// The sink was built from a template that could not be opened
    #[error("Template unavailable: {path}")]
    TemplateUnavailable {
        /// Template path as given
        path: String,
    },
}
