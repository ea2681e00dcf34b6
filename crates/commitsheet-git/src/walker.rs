// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit history walking
//!
//! This module enumerates every commit reachable from a branch head and,
//! for each one, every file path it changed. Non-root commits are diffed
//! against each of their parents with rename detection; root commits report
//! their whole tree.

use crate::commit::{ChangeKind, ChangedFile, Commit};
use crate::error::GitError;
use chrono::{DateTime, Utc};
use git2::{
    DiffFindOptions, DiffOptions, ErrorCode, ObjectType, Repository, Sort, Tree, TreeWalkMode,
    TreeWalkResult,
};
use std::path::Path;
use tracing::{Span, debug, error, info, info_span};

/// Configuration for walking commits
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Maximum number of commits to visit
    pub limit: Option<usize>,
    /// Start from this commit (defaults to HEAD)
    pub from_ref: Option<String>,
    /// Only include commits authored after this date
    pub since: Option<DateTime<Utc>>,
    /// Only include commits authored before this date
    pub until: Option<DateTime<Utc>>,
    /// Visit the root commit first instead of the newest commit
    pub oldest_first: bool,
}

impl WalkOptions {
    /// Create options for walking the N most recent commits
    #[must_use]
    pub fn latest(n: usize) -> Self {
        Self {
            limit: Some(n),
            ..Default::default()
        }
    }

    /// Set the starting reference
    #[must_use]
    pub fn from(mut self, reference: &str) -> Self {
        self.from_ref = Some(reference.to_string());
        self
    }

    /// Filter commits since a date
    #[must_use]
    pub fn since(mut self, date: DateTime<Utc>) -> Self {
        self.since = Some(date);
        self
    }

    /// Filter commits until a date
    #[must_use]
    pub fn until(mut self, date: DateTime<Utc>) -> Self {
        self.until = Some(date);
        self
    }

    /// Visit commits oldest first
    #[must_use]
    pub fn oldest_first(mut self) -> Self {
        self.oldest_first = true;
        self
    }

    fn accepts(&self, date: DateTime<Utc>) -> bool {
        self.since.is_none_or(|since| date >= since) && self.until.is_none_or(|until| date <= until)
    }
}

/// Counters for one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Commits visited
    pub commits: usize,
    /// Changed files forwarded to the visitor
    pub changes: usize,
    /// Commits whose trees or diffs could not be read
    pub failed_commits: usize,
}

/// Walks the history of one repository
pub struct HistoryWalker {
    repo: Repository,
    span: Span,
}

impl HistoryWalker {
    /// Open a git repository at the given path
    ///
    /// The path may be a working copy or a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self::from_repository(repo))
    }

    /// Discover and open a git repository containing the given path
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self::from_repository(repo))
    }

    fn from_repository(repo: Repository) -> Self {
        let span = info_span!("history", repo = %repo.path().display());
        Self { repo, span }
    }

    /// Check if the repository is bare
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    /// Get the repository path
    #[must_use]
    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Walk commits and report every changed file to `visit`
    ///
    /// Files are forwarded as soon as they are found, so a commit that fails
    /// halfway keeps the files already forwarded. Such failures are logged and
    /// counted in [`WalkStats::failed_commits`]; the walk continues with the
    /// next commit. A repository without commits yields empty stats.
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the revision walk itself cannot be set up or
    /// advanced.
    pub fn walk<F>(&self, options: &WalkOptions, mut visit: F) -> Result<WalkStats, GitError>
    where
        F: FnMut(&Commit, &ChangedFile),
    {
        let _entered = self.span.enter();
        let mut stats = WalkStats::default();

        if options.from_ref.is_none() && self.is_empty()? {
            info!("Repository has no commits, nothing to report");
            return Ok(stats);
        }

        let mut revwalk = self.repo.revwalk()?;
        // Commit time order, as `git log` yields without further sorting
        let mut sorting = Sort::TIME;
        if options.oldest_first {
            sorting |= Sort::REVERSE;
        }
        revwalk.set_sorting(sorting)?;

        // Start from specified ref or HEAD
        if let Some(ref from_ref) = options.from_ref {
            let oid = self
                .repo
                .revparse_single(from_ref)
                .map_err(|_| GitError::InvalidReference {
                    reference: from_ref.clone(),
                })?
                .id();
            revwalk.push(oid)?;
        } else {
            revwalk.push_head()?;
        }

        let limit = options.limit.unwrap_or(usize::MAX);

        for oid_result in revwalk {
            if stats.commits >= limit {
                break;
            }

            let oid = oid_result?;
            let git_commit = match self.repo.find_commit(oid) {
                Ok(c) => c,
                Err(e) => {
                    error!(commit = %oid, error = %e, "Could not read commit");
                    stats.failed_commits += 1;
                    continue;
                }
            };

            let commit = Commit::from_git2(&git_commit);
            if !options.accepts(commit.author_date.with_timezone(&Utc)) {
                continue;
            }

            debug!(
                commit = %commit.sha,
                author = %commit.author,
                parents = commit.parents.len(),
                subject = commit.subject(),
                "Walking commit"
            );
            stats.commits += 1;

            let mut emitted = 0;
            let result = self.for_each_change(&git_commit, &mut |file: &ChangedFile| {
                emitted += 1;
                visit(&commit, file);
            });
            stats.changes += emitted;

            if let Err(e) = result {
                error!(
                    commit = %commit.sha,
                    error = %e,
                    "Could not get committed files of commit"
                );
                stats.failed_commits += 1;
            }
        }

        debug!(
            commits = stats.commits,
            changes = stats.changes,
            failed = stats.failed_commits,
            "History walk finished"
        );
        Ok(stats)
    }

    /// Get a single commit by SHA or reference
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if the reference cannot be resolved.
    pub fn get_commit(&self, reference: &str) -> Result<Commit, GitError> {
        let git_commit = self.resolve(reference)?;
        Ok(Commit::from_git2(&git_commit))
    }

    /// List the files changed by a single commit
    ///
    /// Uses the same rules as [`HistoryWalker::walk`], but any read failure
    /// is returned instead of logged.
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if the reference cannot be
    /// resolved, or `GitError::Git2` if a tree or diff cannot be read.
    pub fn changed_files(&self, reference: &str) -> Result<Vec<ChangedFile>, GitError> {
        let git_commit = self.resolve(reference)?;
        let mut files = Vec::new();
        self.for_each_change(&git_commit, &mut |file: &ChangedFile| {
            files.push(file.clone());
        })?;
        Ok(files)
    }

    /// Get the HEAD commit SHA
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved.
    pub fn head_sha(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        let oid = head.target().ok_or_else(|| GitError::InvalidReference {
            reference: "HEAD".to_string(),
        })?;
        Ok(oid.to_string())
    }

    fn resolve(&self, reference: &str) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|_| GitError::InvalidReference {
                reference: reference.to_string(),
            })
    }

    /// True when HEAD points at a branch with no commits yet
    fn is_empty(&self) -> Result<bool, GitError> {
        match self.repo.head() {
            Ok(_) => Ok(false),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn for_each_change(
        &self,
        git_commit: &git2::Commit<'_>,
        emit: &mut dyn FnMut(&ChangedFile),
    ) -> Result<(), GitError> {
        let tree = git_commit.tree()?;

        if git_commit.parent_count() == 0 {
            return walk_full_tree(&tree, emit);
        }

        // One pass per parent; merges report paths once per parent they differ from
        for i in 0..git_commit.parent_count() {
            let parent_tree = git_commit.parent(i)?.tree()?;

            let mut opts = DiffOptions::new();
            opts.ignore_whitespace(false);
            let mut diff =
                self.repo
                    .diff_tree_to_tree(Some(&parent_tree), Some(&tree), Some(&mut opts))?;

            let mut find = DiffFindOptions::new();
            find.renames(true);
            diff.find_similar(Some(&mut find))?;

            for delta in diff.deltas() {
                let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path())
                else {
                    continue;
                };
                let file = ChangedFile::new(
                    path.display().to_string(),
                    ChangeKind::from_delta(delta.status()),
                );
                debug!(kind = %file.kind, path = %file.path, parent = i, "Changed file");
                emit(&file);
            }
        }

        Ok(())
    }
}

/// Report every non-tree entry of a root commit's tree as added
fn walk_full_tree(tree: &Tree<'_>, emit: &mut dyn FnMut(&ChangedFile)) -> Result<(), GitError> {
    tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() != Some(ObjectType::Tree) {
            let name = String::from_utf8_lossy(entry.name_bytes());
            let file = ChangedFile::new(format!("{root}{name}"), ChangeKind::Added);
            debug!(path = %file.path, "Root tree file");
            emit(&file);
        }
        TreeWalkResult::Ok
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    #[test]
    fn test_open_nonexistent_repository() {
        let result = HistoryWalker::open("/nonexistent/path");
        match result {
            Err(GitError::RepositoryNotFound { path }) => {
                assert!(path.contains("nonexistent"));
            }
            _ => panic!("Expected RepositoryNotFound error"),
        }
    }

    #[test]
    fn test_walk_options_builder() {
        let options = WalkOptions::latest(10).from("main").oldest_first();

        assert_eq!(options.limit, Some(10));
        assert_eq!(options.from_ref, Some("main".to_string()));
        assert!(options.oldest_first);
    }

    #[test]
    fn test_default_options_walk_newest_first_without_limit() {
        let options = WalkOptions::default();
        assert!(options.limit.is_none());
        assert!(!options.oldest_first);
    }

    #[test]
    fn test_date_window() {
        let jan = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

        let options = WalkOptions::default().since(jan).until(feb);
        assert!(options.accepts(jan));
        assert!(options.accepts(feb));
        assert!(!options.accepts(mar));
        assert!(WalkOptions::default().accepts(mar));
    }
}
