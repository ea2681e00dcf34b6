//! Commit and changed-file types

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// A commit read from repository history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The commit SHA (40 hex characters)
    pub sha: String,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Author date, in the author's own UTC offset
    pub author_date: DateTime<FixedOffset>,
    /// Full commit message; `None` when empty
    pub message: Option<String>,
    /// Parent commit SHAs, in parent order
    pub parents: Vec<String>,
}

impl Commit {
    /// Build a `Commit` from a libgit2 commit
    #[must_use]
    pub fn from_git2(git_commit: &git2::Commit<'_>) -> Self {
        let author = git_commit.author();
        let encoding = git_commit.message_encoding();
        let message = git_commit.message_bytes();
        Self {
            sha: git_commit.id().to_string(),
            author: decode_text(author.name_bytes(), encoding),
            author_email: decode_text(author.email_bytes(), encoding),
            author_date: signature_time(&author.when()),
            message: (!message.is_empty()).then(|| decode_text(message, encoding)),
            parents: git_commit.parent_ids().map(|id| id.to_string()).collect(),
        }
    }

    /// True for a full 40-digit hex object id
    #[must_use]
    pub fn is_valid_sha(sha: &str) -> bool {
        sha.len() == 40 && sha.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Abbreviated id for log lines
    #[must_use]
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    /// A root commit has no parents; its whole tree is reported
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// First line of the message, or `""`
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message
            .as_deref()
            .and_then(|m| m.lines().next())
            .unwrap_or("")
    }
}

/// Decode commit text written in the commit's declared encoding
///
/// UTF-8 is tried first since most commits use it whatever their header
/// says. Latin-1 maps byte for byte; anything else is decoded lossily.
fn decode_text(bytes: &[u8], encoding: Option<&str>) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    match encoding.map(str::to_ascii_lowercase).as_deref() {
        Some("iso-8859-1" | "iso8859-1" | "latin1" | "latin-1") => {
            bytes.iter().copied().map(char::from).collect()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Convert a git signature time into a date carrying its original offset
fn signature_time(time: &git2::Time) -> DateTime<FixedOffset> {
    let utc = DateTime::from_timestamp(time.seconds(), 0).unwrap_or_else(Utc::now);
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    utc.with_timezone(&offset)
}

/// How a file changed in a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// File was added (every file of a root commit is reported as added)
    Added,
    /// File content or mode changed
    Modified,
    /// File was removed
    Deleted,
    /// File was renamed, possibly with edits
    Renamed,
    /// File was copied from another path
    Copied,
    /// Entry changed type (e.g. file to symlink)
    TypeChanged,
    /// Any other delta libgit2 reports
    Other,
}

impl ChangeKind {
    /// Classify a libgit2 delta status
    #[must_use]
    pub fn from_delta(delta: git2::Delta) -> Self {
        match delta {
            git2::Delta::Added => Self::Added,
            git2::Delta::Modified => Self::Modified,
            git2::Delta::Deleted => Self::Deleted,
            git2::Delta::Renamed => Self::Renamed,
            git2::Delta::Copied => Self::Copied,
            git2::Delta::Typechange => Self::TypeChanged,
            _ => Self::Other,
        }
    }

    /// Lowercase label, as used in logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
            Self::TypeChanged => "type_changed",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path touched by exactly one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Repository-relative path, `/` separated
    pub path: String,
    /// What happened to the path
    pub kind: ChangeKind,
}

impl ChangedFile {
    /// Create a changed file entry
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
