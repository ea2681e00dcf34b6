// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Obtaining local working copies of remote repositories
//!
//! The [`Fetcher`] clones a remote (including submodules) and, when the
//! checkout path already holds a repository, pulls into it instead. Every
//! `git2::Repository` handle opened here is dropped before the operation
//! returns.
//!
//! # Example
//!
//! ```no_run
//! use commitsheet_git::{Credentials, Fetcher, RepositorySource, text_progress};
//!
//! let source = RepositorySource::new(
//!     "https://bitbucket.org/team/project.git",
//!     Credentials::new("user", "secret"),
//!     "/tmp/project",
//! );
//! let outcome = Fetcher::new().with_progress(text_progress()).clone_or_pull(&source);
//! assert!(outcome.is_success());
//! ```

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    AnnotatedCommit, Cred, CredentialType, ErrorCode, FetchOptions, RemoteCallbacks, Repository,
    SubmoduleUpdateOptions,
};
use tracing::{Level, Span, debug, error, info, info_span, warn};

use crate::commit::Commit;
use crate::error::GitError;
use crate::progress::{ProgressCallback, ProgressEvent};
use crate::source::{Credentials, RepositorySource};

/// Remote that pulls fetch from
const REMOTE_NAME: &str = "origin";

/// Result of a single clone attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneResult {
    /// The remote was cloned into the checkout path
    Cloned,
    /// The checkout path already holds a non-empty directory; nothing was touched
    AlreadyExists,
    /// The clone failed (invalid remote, network, authentication, ...)
    TransportFailed(String),
}

/// What a pull did to an existing checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullStatus {
    /// The local branch already contained the remote head
    UpToDate,
    /// The local branch was moved forward to the remote head
    FastForwarded,
    /// A merge commit joining local and remote history was created
    Merged,
}

/// Result of [`Fetcher::clone_or_pull`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fresh clone
    Cloned,
    /// Existing checkout updated by a pull
    Pulled(PullStatus),
    /// Neither clone nor pull succeeded
    Failed(String),
}

impl FetchOutcome {
    /// True for `Cloned` and `Pulled`
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Clones and pulls remote repositories
pub struct Fetcher {
    progress: Option<ProgressCallback>,
    span: Span,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Create a fetcher that reports no progress
    #[must_use]
    pub fn new() -> Self {
        Self {
            progress: None,
            span: info_span!("fetcher"),
        }
    }

    /// Report transfer and checkout progress to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Clone `source` into its checkout path, with submodules
    ///
    /// A checkout path that already holds files is reported as
    /// [`CloneResult::AlreadyExists`] and left untouched. Any other failure is
    /// logged with the URL.
    pub fn clone_repo(&self, source: &RepositorySource) -> CloneResult {
        let _entered = self.span.enter();
        let url = source.url();
        let path = source.checkout_path();
        info!(url, path = %path.display(), "Cloning project");

        match self.clone_into(url, path, source.credentials()) {
            Ok(()) => {
                info!(url, "Clone finished");
                CloneResult::Cloned
            }
            Err(e) if e.code() == ErrorCode::Exists => {
                warn!(
                    url,
                    path = %path.display(),
                    error = %e.message(),
                    "Checkout path is not empty"
                );
                CloneResult::AlreadyExists
            }
            Err(e) => {
                error!(url, error = %e, "Could not clone project");
                CloneResult::TransportFailed(e.message().to_string())
            }
        }
    }

    /// Clone `source`, or pull into its checkout path if a repository is already there
    ///
    /// Never clones over an existing checkout.
    pub fn clone_or_pull(&self, source: &RepositorySource) -> FetchOutcome {
        match self.clone_repo(source) {
            CloneResult::Cloned => FetchOutcome::Cloned,
            CloneResult::AlreadyExists => {
                let _entered = self.span.enter();
                info!(url = source.url(), "Will try to pull");
                match self.pull(source) {
                    Ok(status) => FetchOutcome::Pulled(status),
                    Err(e) => {
                        error!(
                            url = source.url(),
                            path = %source.checkout_path().display(),
                            error = %e,
                            "Could not pull project"
                        );
                        FetchOutcome::Failed(e.to_string())
                    }
                }
            }
            CloneResult::TransportFailed(reason) => FetchOutcome::Failed(reason),
        }
    }

    /// Fetch the current branch from `origin` and merge it into the checkout
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the checkout path holds no
    /// repository, `GitError::MergeConflicts` if the merge does not apply
    /// cleanly, or `GitError::Git2` for fetch and checkout failures.
    pub fn pull(&self, source: &RepositorySource) -> Result<PullStatus, GitError> {
        let _entered = self.span.enter();
        let path = source.checkout_path();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;

        let branch = {
            let head = repo.head()?;
            head.shorthand()
                .ok_or_else(|| GitError::InvalidReference {
                    reference: "HEAD".to_string(),
                })?
                .to_string()
        };
        debug!(url = source.url(), branch = %branch, "Fetching from {}", REMOTE_NAME);

        let mut remote = repo.find_remote(REMOTE_NAME)?;
        let mut options = self.fetch_options(source.credentials());
        remote.fetch(&[branch.as_str()], Some(&mut options), None)?;
        drop(remote);

        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let incoming = repo.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = repo.merge_analysis(&[&incoming])?;

        let status = if analysis.is_up_to_date() {
            PullStatus::UpToDate
        } else if analysis.is_fast_forward() {
            // Local edits survive unless the incoming commits touch them,
            // in which case the checkout refuses and the branch stays put
            let target = repo.find_commit(incoming.id())?;
            repo.checkout_tree(target.as_object(), Some(CheckoutBuilder::new().safe()))?;

            let refname = format!("refs/heads/{branch}");
            let mut reference = repo.find_reference(&refname)?;
            reference.set_target(
                incoming.id(),
                &format!("pull: fast-forward {branch} to {}", incoming.id()),
            )?;
            repo.set_head(&refname)?;
            PullStatus::FastForwarded
        } else {
            merge_incoming(&repo, &incoming, path)?;
            PullStatus::Merged
        };

        info!(url = source.url(), branch = %branch, status = ?status, "Pull finished");
        Ok(status)
    }

    /// Clone each URL into the checkout path at the same index
    ///
    /// Plain clones: a checkout path that already holds files is reported as
    /// [`CloneResult::AlreadyExists`], never pulled. A failed URL does not
    /// stop the remaining ones.
    ///
    /// # Errors
    ///
    /// Returns `GitError::MismatchedCheckouts` before cloning anything if the
    /// two slices differ in length.
    pub fn clone_many<U, P>(
        &self,
        urls: &[U],
        checkout_paths: &[P],
        credentials: &Credentials,
    ) -> Result<Vec<CloneResult>, GitError>
    where
        U: AsRef<str>,
        P: AsRef<Path>,
    {
        if urls.len() != checkout_paths.len() {
            return Err(GitError::MismatchedCheckouts {
                urls: urls.len(),
                paths: checkout_paths.len(),
            });
        }

        let results = urls
            .iter()
            .zip(checkout_paths)
            .map(|(url, path)| {
                let source =
                    RepositorySource::new(url.as_ref(), credentials.clone(), path.as_ref());
                self.clone_repo(&source)
            })
            .collect();
        Ok(results)
    }

    fn clone_into(
        &self,
        url: &str,
        path: &Path,
        credentials: &Credentials,
    ) -> Result<(), git2::Error> {
        let mut checkout = CheckoutBuilder::new();
        if let Some(progress) = self.progress.as_ref() {
            checkout.progress(move |file, completed, total| {
                progress(&ProgressEvent::Checkout {
                    path: file.map(|p| p.display().to_string()),
                    completed,
                    total,
                });
            });
        }

        let mut builder = RepoBuilder::new();
        builder
            .fetch_options(self.fetch_options(credentials))
            .with_checkout(checkout);
        let repo = builder.clone(url, path)?;

        self.update_submodules(&repo, credentials)?;
        log_history(&repo);
        Ok(())
    }

    fn update_submodules(
        &self,
        repo: &Repository,
        credentials: &Credentials,
    ) -> Result<(), git2::Error> {
        for mut submodule in repo.submodules()? {
            let mut options = SubmoduleUpdateOptions::new();
            options.fetch(self.fetch_options(credentials));
            submodule.update(true, Some(&mut options))?;
            debug!(
                name = submodule.name().unwrap_or("<non-utf8>"),
                "Updated submodule"
            );

            let nested = submodule.open()?;
            self.update_submodules(&nested, credentials)?;
        }
        Ok(())
    }

    fn fetch_options<'a>(&'a self, credentials: &'a Credentials) -> FetchOptions<'a> {
        let mut callbacks = RemoteCallbacks::new();

        callbacks.credentials(single_attempt_credentials(credentials));

        if let Some(progress) = self.progress.as_ref() {
            callbacks.transfer_progress(move |stats| {
                progress(&ProgressEvent::Transfer {
                    received_objects: stats.received_objects(),
                    total_objects: stats.total_objects(),
                    indexed_deltas: stats.indexed_deltas(),
                    total_deltas: stats.total_deltas(),
                    received_bytes: stats.received_bytes(),
                });
                true
            });
        }

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        options
    }
}

/// Credential callback that answers once
///
/// libgit2 asks again after a rejected credential; the second request fails
/// the transfer instead of looping.
fn single_attempt_credentials(
    credentials: &Credentials,
) -> impl FnMut(&str, Option<&str>, CredentialType) -> Result<Cred, git2::Error> + '_ {
    let mut attempts = 0;
    move |_url, _username_from_url, _allowed| {
        attempts += 1;
        if attempts > 1 {
            return Err(git2::Error::from_str("credentials rejected by remote"));
        }
        if credentials.is_anonymous() {
            Cred::default()
        } else {
            Cred::userpass_plaintext(credentials.username(), credentials.password())
        }
    }
}

/// Merge the fetched head into the checked out branch and commit the result
fn merge_incoming(
    repo: &Repository,
    incoming: &AnnotatedCommit<'_>,
    path: &Path,
) -> Result<(), GitError> {
    repo.merge(&[incoming], None, None)?;

    let mut index = repo.index()?;
    if index.has_conflicts() {
        // Conflict markers stay in the working copy, as with `git pull`
        return Err(GitError::MergeConflicts {
            path: path.display().to_string(),
        });
    }

    let tree = repo.find_tree(index.write_tree()?)?;
    let local = repo.head()?.peel_to_commit()?;
    let remote = repo.find_commit(incoming.id())?;
    let signature = repo.signature()?;
    let message = format!("Merge {} into {}", remote.id(), local.id());
    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        &message,
        &tree,
        &[&local, &remote],
    )?;
    repo.cleanup_state()?;
    Ok(())
}

/// Dump the cloned history as JSON at debug level
fn log_history(repo: &Repository) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    if let Err(e) = try_log_history(repo) {
        debug!(error = %e, "Could not list cloned history");
    }
}

fn try_log_history(repo: &Repository) -> Result<(), git2::Error> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    for oid in revwalk {
        let commit = Commit::from_git2(&repo.find_commit(oid?)?);
        match serde_json::to_string(&commit) {
            Ok(json) => debug!(commit = %json, "Cloned commit"),
            Err(e) => debug!(sha = %commit.sha, error = %e, "Could not serialize commit"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_fetch_outcome_success() {
        assert!(FetchOutcome::Cloned.is_success());
        assert!(FetchOutcome::Pulled(PullStatus::UpToDate).is_success());
        assert!(!FetchOutcome::Failed("boom".to_string()).is_success());
    }

    #[test]
    fn test_credentials_answer_only_once() {
        let credentials = Credentials::new("user", "secret");
        let mut callback = single_attempt_credentials(&credentials);

        let first = callback(
            "https://example.com/a.git",
            None,
            CredentialType::USER_PASS_PLAINTEXT,
        );
        assert!(first.is_ok());

        let second = callback(
            "https://example.com/a.git",
            None,
            CredentialType::USER_PASS_PLAINTEXT,
        );
        let err = second.err().expect("second request is refused");
        assert_eq!(err.message(), "credentials rejected by remote");
    }

    #[test]
    fn test_clone_many_rejects_mismatched_lengths() {
        let fetcher = Fetcher::new();
        let urls = ["https://example.com/a.git", "https://example.com/b.git"];
        let paths = ["/tmp/commitsheet-never-created-a"];

        let result = fetcher.clone_many(&urls, &paths, &Credentials::anonymous());
        match result {
            Err(GitError::MismatchedCheckouts { urls, paths }) => {
                assert_eq!(urls, 2);
                assert_eq!(paths, 1);
            }
            other => panic!("Expected MismatchedCheckouts, got {:?}", other),
        }
        assert!(!Path::new("/tmp/commitsheet-never-created-a").exists());
    }

    #[test]
    fn test_clone_many_empty_input() {
        let urls: [&str; 0] = [];
        let paths: [&str; 0] = [];
        let results = Fetcher::new()
            .clone_many(&urls, &paths, &Credentials::anonymous())
            .expect("empty batch is valid");
        assert!(results.is_empty());
    }
}
