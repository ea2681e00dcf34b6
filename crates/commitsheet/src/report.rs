// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report assembly
//!
//! A [`Reporter`] walks one or more local repositories and writes one row per
//! (commit, changed file) pair to a [`ReportSink`]. Row numbers come from a
//! single counter, so a report spanning several repositories is numbered
//! 1, 2, 3, ... without gaps.
//!
//! # Example
//!
//! ```no_run
//! use commitsheet::report::Reporter;
//! use commitsheet_git::WalkOptions;
//! use commitsheet_report::ExcelSink;
//!
//! let mut reporter = Reporter::new(ExcelSink::new());
//! let stats = reporter.add_repository("/path/to/repo", &WalkOptions::default());
//! println!("{} rows from {} commits", stats.rows, stats.commits);
//! reporter.finish("history.xlsx");
//! ```

use std::path::Path;

use commitsheet_git::{HistoryWalker, WalkOptions};
use commitsheet_report::{ReportRow, ReportSink};
use tracing::{Span, error, info, info_span};

/// Statistics from reporting on one or more repositories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Commits visited
    pub commits: usize,
    /// Rows written to the sink
    pub rows: usize,
    /// Commits whose changes could not be read
    pub failed_commits: usize,
    /// Repositories that could not be opened or walked
    pub failed_repositories: usize,
}

impl ReportStats {
    /// Merge stats from another repository
    pub fn merge(&mut self, other: &ReportStats) {
        self.commits += other.commits;
        self.rows += other.rows;
        self.failed_commits += other.failed_commits;
        self.failed_repositories += other.failed_repositories;
    }

    /// True when every repository and commit was read
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_commits == 0 && self.failed_repositories == 0
    }
}

/// Turns repository history into numbered report rows
pub struct Reporter<S: ReportSink> {
    sink: S,
    next_sequence: u32,
    span: Span,
}

impl<S: ReportSink> Reporter<S> {
    /// Create a reporter writing to `sink`, numbering rows from 1
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            next_sequence: 1,
            span: info_span!("reporter"),
        }
    }

    /// Sequence number the next row will get
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    /// Get reference to the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the reporter, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Walk the repository at `path` and write its rows
    ///
    /// Failures are logged and counted in the returned stats; rows written
    /// before a failure stay in the sink.
    pub fn add_repository(&mut self, path: impl AsRef<Path>, options: &WalkOptions) -> ReportStats {
        let path = path.as_ref();
        let _entered = self.span.enter();
        info!(path = %path.display(), "Reporting repository");

        let walker = match HistoryWalker::open(path) {
            Ok(walker) => walker,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Could not open repository");
                return ReportStats {
                    failed_repositories: 1,
                    ..Default::default()
                };
            }
        };

        let sink = &mut self.sink;
        let next_sequence = &mut self.next_sequence;
        let mut rows = 0;
        let walked = walker.walk(options, |commit, file| {
            let row = ReportRow::new(
                *next_sequence,
                &commit.sha,
                commit.author_date,
                &commit.author,
                &commit.author_email,
                &file.path,
                commit.message.as_deref(),
            );
            sink.write(&row);
            *next_sequence += 1;
            rows += 1;
        });

        match walked {
            Ok(walk) => {
                info!(
                    path = %path.display(),
                    commits = walk.commits,
                    rows,
                    failed_commits = walk.failed_commits,
                    "Repository reported"
                );
                ReportStats {
                    commits: walk.commits,
                    rows,
                    failed_commits: walk.failed_commits,
                    failed_repositories: 0,
                }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Could not walk repository history");
                ReportStats {
                    rows,
                    failed_repositories: 1,
                    ..Default::default()
                }
            }
        }
    }

    /// Report on several repositories in order, merging their stats
    pub fn add_repositories<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        options: &WalkOptions,
    ) -> ReportStats {
        let mut total = ReportStats::default();
        for path in paths {
            total.merge(&self.add_repository(path, options));
        }
        total
    }

    /// Persist the report to `path`; failures are logged and return `false`
    pub fn finish(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let _entered = self.span.enter();
        match self.sink.finalize(path) {
            Ok(()) => {
                info!(
                    output = %path.display(),
                    rows = self.sink.rows_written(),
                    "Report written"
                );
                true
            }
            Err(e) => {
                error!(output = %path.display(), error = %e, "Could not write report");
                false
            }
        }
    }
}
