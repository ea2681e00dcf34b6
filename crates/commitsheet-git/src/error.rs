// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for commitsheet-git

use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Invalid commit reference (branch, tag, or SHA)
    #[error("Invalid commit reference: {reference}")]
    InvalidReference {
        /// The reference string that could not be resolved
        reference: String,
    },

    /// Batch clone was given a different number of URLs and checkout paths
    #[error("Got {urls} URLs but {paths} checkout paths")]
    MismatchedCheckouts {
        /// Number of URLs supplied
        urls: usize,
        /// Number of checkout paths supplied
        paths: usize,
    },

    /// A pull produced a merge with conflicts; the working copy was left
    /// with conflict markers and no merge commit was created
    #[error("Merge conflicts while pulling into {path}")]
    MergeConflicts {
        /// The checkout that could not be merged cleanly
        path: String,
    },
}
