// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Remote repository descriptions

use std::fmt;
use std::path::{Path, PathBuf};

/// Username/password pair used for HTTPS remotes
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create a credential pair
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Credentials that authenticate nobody (public or local remotes)
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The account name
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The account password
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// True when no username was given
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A remote repository and where to check it out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySource {
    url: String,
    credentials: Credentials,
    checkout_path: PathBuf,
}

impl RepositorySource {
    /// Describe a remote to be checked out at `checkout_path`
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        credentials: Credentials,
        checkout_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            credentials,
            checkout_path: checkout_path.into(),
        }
    }

    /// Remote URL, e.g. `https://bitbucket.org/team/project.git`
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Credentials for the remote
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Local directory holding the working copy
    #[must_use]
    pub fn checkout_path(&self) -> &Path {
        &self.checkout_path
    }
}

/// Derive a directory name from a remote URL
///
/// `https://host/team/project.git` becomes `project`. Returns `None` when the
/// URL has no usable last segment.
#[must_use]
pub fn repo_name_from_url(url: &str) -> Option<&str> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':', '\\']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty()).then_some(name)
}
