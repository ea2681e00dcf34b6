//! Configuration for the commitsheet command line
//!
//! This module provides the clap-derived argument types, their validation,
//! and the defaults that depend on the platform (checkout root, log level,
//! report format).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use commitsheet_git::{Credentials, WalkOptions, repo_name_from_url};

/// Commitsheet - export per-file git history to a spreadsheet
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "commitsheet")]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs and progress output
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Clone a repository, or pull it if the checkout already exists
    ///
    /// Example:
    ///   commitsheet clone --url https://github.com/rust-lang/log.git
    Clone {
        /// Remote URL (or local path) to clone from
        #[arg(long)]
        url: String,

        /// Checkout directory
        ///
        /// Defaults to ~/.local/share/commitsheet/<repo-name> (or platform equivalent).
        #[arg(long)]
        path: Option<PathBuf>,

        /// Username for HTTPS remotes
        #[arg(long, env = "COMMITSHEET_USERNAME")]
        username: Option<String>,

        /// Password or token for HTTPS remotes
        #[arg(long, env = "COMMITSHEET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Clone several repositories; the n-th --url goes to the n-th --path
    ///
    /// Existing checkouts are reported and left alone.
    CloneMany {
        /// Remote URLs, in order
        #[arg(long = "url", required = true)]
        urls: Vec<String>,

        /// Checkout directories, in the same order as the URLs
        #[arg(long = "path", required = true)]
        paths: Vec<PathBuf>,

        /// Username for HTTPS remotes
        #[arg(long, env = "COMMITSHEET_USERNAME")]
        username: Option<String>,

        /// Password or token for HTTPS remotes
        #[arg(long, env = "COMMITSHEET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Write one row per (commit, changed file) for one or more repositories
    ///
    /// Rows from all repositories share one sequence, numbered from 1.
    ///
    /// Example:
    ///   commitsheet report --repo . --output history.xlsx --oldest-first
    Report {
        /// Local repository to report on (repeat for several)
        #[arg(long = "repo", required = true)]
        repos: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Spreadsheet template whose first sheet holds the header rows
        #[arg(long)]
        template: Option<PathBuf>,

        /// Output format (defaults from the output file extension)
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,

        /// Maximum number of commits per repository
        #[arg(long)]
        limit: Option<usize>,

        /// Start walking from this reference instead of HEAD
        #[arg(long)]
        from: Option<String>,

        /// Only commits authored at or after this RFC 3339 date
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Only commits authored at or before this RFC 3339 date
        #[arg(long)]
        until: Option<DateTime<Utc>>,

        /// Start with the root commit instead of the newest one
        #[arg(long, default_value = "false")]
        oldest_first: bool,
    },
}

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Excel workbook
    Xlsx,
    /// JSON array of rows
    Json,
}

impl ReportFormat {
    /// Pick the format from an output path: `.json` is JSON, anything else is xlsx
    #[must_use]
    pub fn from_output(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Xlsx,
        }
    }

    /// An explicit format wins over the output extension
    #[must_use]
    pub fn resolve(explicit: Option<Self>, output: &Path) -> Self {
        explicit.unwrap_or_else(|| Self::from_output(output))
    }
}

impl Config {
    /// Validate the configuration before any work is done
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `clone` has no `--path` and no directory name can be derived from the URL
    /// - `clone-many` has different numbers of URLs and paths
    /// - a `report` repository or template does not exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.command {
            Some(Command::Clone { url, path: None, .. }) => {
                if repo_name_from_url(url).is_none() {
                    return Err(ConfigError::CheckoutPathUnknown(url.clone()));
                }
            }
            Some(Command::CloneMany { urls, paths, .. }) => {
                if urls.len() != paths.len() {
                    return Err(ConfigError::MismatchedCheckouts {
                        urls: urls.len(),
                        paths: paths.len(),
                    });
                }
            }
            Some(Command::Report {
                repos, template, ..
            }) => {
                for repo in repos {
                    if !repo.exists() {
                        return Err(ConfigError::RepositoryNotFound(repo.clone()));
                    }
                    if !repo.is_dir() {
                        return Err(ConfigError::RepositoryNotDirectory(repo.clone()));
                    }
                }
                if let Some(template) = template
                    && !template.is_file()
                {
                    return Err(ConfigError::TemplateNotFound(template.clone()));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Root directory for checkouts made without `--path`
///
/// Default location is platform-specific:
/// - macOS: ~/Library/Application Support/commitsheet
/// - Linux: ~/.local/share/commitsheet
/// - Windows: %LOCALAPPDATA%\commitsheet
#[must_use]
pub fn default_checkout_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("commitsheet")
}

/// The checkout directory for `url`, using the default root when `path` is `None`
#[must_use]
pub fn checkout_path(url: &str, path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => Some(path.to_path_buf()),
        None => repo_name_from_url(url).map(|name| default_checkout_root().join(name)),
    }
}

/// Credentials from the optional flags; no username means anonymous
#[must_use]
pub fn credentials(username: Option<&str>, password: Option<&str>) -> Credentials {
    match username {
        Some(username) if !username.is_empty() => {
            Credentials::new(username, password.unwrap_or_default())
        }
        _ => Credentials::anonymous(),
    }
}

/// Walk options for the `report` flags
#[must_use]
pub fn walk_options(
    limit: Option<usize>,
    from: Option<&str>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    oldest_first: bool,
) -> WalkOptions {
    WalkOptions {
        limit,
        from_ref: from.map(str::to_string),
        since,
        until,
        oldest_first,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No checkout directory given and none derivable from the URL
    #[error("Cannot derive a checkout directory from {0}, pass --path")]
    CheckoutPathUnknown(String),

    /// Batch clone URLs and paths do not pair up
    #[error("Got {urls} URLs but {paths} checkout paths")]
    MismatchedCheckouts {
        /// Number of URLs
        urls: usize,
        /// Number of checkout paths
        paths: usize,
    },

    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepositoryNotFound(PathBuf),

    /// Repository path is not a directory
    #[error("Repository path is not a directory: {0}")]
    RepositoryNotDirectory(PathBuf),

    /// Template file not found
    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),
}
