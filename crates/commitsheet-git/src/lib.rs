// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! commitsheet-git: Git checkout and history walking for commitsheet
//!
//! This library crate clones or pulls remote repositories and walks local
//! history, reporting every file each commit changed.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use commitsheet_git::{HistoryWalker, WalkOptions};
//!
//! let walker = HistoryWalker::open(".").expect("open repo");
//! walker
//!     .walk(&WalkOptions::latest(10), |commit, file| {
//!         println!("{} {} {}", commit.short_sha(), file.kind, file.path);
//!     })
//!     .expect("walk commits");
//! ```

pub mod commit;
pub mod error;
pub mod fetch;
pub mod progress;
pub mod source;
pub mod walker;

pub use commit::{ChangeKind, ChangedFile, Commit};
pub use error::GitError;
pub use fetch::{CloneResult, FetchOutcome, Fetcher, PullStatus};
pub use progress::{ProgressCallback, ProgressEvent, text_progress};
pub use source::{Credentials, RepositorySource, repo_name_from_url};
pub use walker::{HistoryWalker, WalkOptions, WalkStats};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{ChangedFile, Commit};
    pub use crate::error::GitError;
    pub use crate::fetch::{CloneResult, FetchOutcome, Fetcher};
    pub use crate::source::{Credentials, RepositorySource};
    pub use crate::walker::{HistoryWalker, WalkOptions};
}
