// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! JSON sink

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{error, info};

use crate::error::ReportError;
use crate::row::ReportRow;
use crate::sink::ReportSink;

/// Buffers rows and writes them as a pretty-printed JSON array
#[derive(Debug, Default)]
pub struct JsonSink {
    rows: Vec<ReportRow>,
}

impl JsonSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.rows)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl ReportSink for JsonSink {
    fn write(&mut self, row: &ReportRow) {
        self.rows.push(row.clone());
    }

    fn finalize(&mut self, path: &Path) -> Result<(), ReportError> {
        match self.write_to(path) {
            Ok(()) => {
                info!(output = %path.display(), rows = self.rows.len(), "Wrote JSON report");
                Ok(())
            }
            Err(e) => {
                error!(output = %path.display(), error = %e, "Could not write JSON report");
                Err(e)
            }
        }
    }

    fn rows_written(&self) -> usize {
        self.rows.len()
    }
}
