// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI parsing tests
//!
//! These tests cover subcommand arguments, global flags, and how parsed
//! arguments are validated before any work starts.

use std::path::PathBuf;

use clap::Parser;
use commitsheet::config::{Command, Config, ConfigError, ReportFormat};
use tracing::Level;

// ============================================================================
// Global flags
// ============================================================================

#[test]
fn test_verbose_after_subcommand() {
    let config = Config::try_parse_from([
        "commitsheet",
        "report",
        "--repo",
        ".",
        "-o",
        "x.xlsx",
        "-v",
    ])
    .expect("parse should succeed");
    assert!(config.verbose);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_quiet_before_subcommand() {
    let config = Config::try_parse_from([
        "commitsheet",
        "-q",
        "clone",
        "--url",
        "https://example.com/a.git",
    ])
    .expect("parse should succeed");
    assert!(config.quiet);
    assert_eq!(config.log_level(), Level::WARN);
}

#[test]
fn test_verbose_wins_over_quiet() {
    let config = Config::try_parse_from(["commitsheet", "-v", "-q", "clone", "--url", "u/a.git"])
        .expect("parse should succeed");
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_no_arguments_shows_help() {
    let result = Config::try_parse_from(["commitsheet"]);
    assert!(result.is_err(), "bare invocation should print help");
}

// ============================================================================
// clone
// ============================================================================

#[test]
fn test_clone_arguments() {
    let config = Config::try_parse_from([
        "commitsheet",
        "clone",
        "--url",
        "https://bitbucket.org/team/project.git",
        "--path",
        "/tmp/project",
        "--username",
        "alice",
        "--password",
        "secret",
    ])
    .expect("parse should succeed");

    match config.command {
        Some(Command::Clone {
            url,
            path,
            username,
            password,
        }) => {
            assert_eq!(url, "https://bitbucket.org/team/project.git");
            assert_eq!(path, Some(PathBuf::from("/tmp/project")));
            assert_eq!(username.as_deref(), Some("alice"));
            assert_eq!(password.as_deref(), Some("secret"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_clone_requires_url() {
    let result = Config::try_parse_from(["commitsheet", "clone", "--path", "/tmp/x"]);
    assert!(result.is_err());
}

#[test]
fn test_clone_without_path_validates() {
    let config =
        Config::try_parse_from(["commitsheet", "clone", "--url", "https://example.com/a.git"])
            .expect("parse should succeed");
    assert!(config.validate().is_ok());
}

// ============================================================================
// clone-many
// ============================================================================

#[test]
fn test_clone_many_repeated_flags() {
    let config = Config::try_parse_from([
        "commitsheet",
        "clone-many",
        "--url",
        "https://example.com/a.git",
        "--path",
        "/tmp/a",
        "--url",
        "https://example.com/b.git",
        "--path",
        "/tmp/b",
    ])
    .expect("parse should succeed");

    match &config.command {
        Some(Command::CloneMany { urls, paths, .. }) => {
            assert_eq!(urls.len(), 2);
            assert_eq!(paths[1], PathBuf::from("/tmp/b"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(config.validate().is_ok());
}

#[test]
fn test_clone_many_mismatch_rejected_by_validate() {
    let config = Config::try_parse_from([
        "commitsheet",
        "clone-many",
        "--url",
        "https://example.com/a.git",
        "--url",
        "https://example.com/b.git",
        "--path",
        "/tmp/a",
    ])
    .expect("parse should succeed");

    assert!(matches!(
        config.validate(),
        Err(ConfigError::MismatchedCheckouts { urls: 2, paths: 1 })
    ));
}

// ============================================================================
// report
// ============================================================================

#[test]
fn test_report_arguments() {
    let config = Config::try_parse_from([
        "commitsheet",
        "report",
        "--repo",
        "/repos/one",
        "--repo",
        "/repos/two",
        "--output",
        "history.json",
        "--limit",
        "50",
        "--from",
        "main",
        "--since",
        "2024-01-01T00:00:00Z",
        "--oldest-first",
    ])
    .expect("parse should succeed");

    match config.command {
        Some(Command::Report {
            repos,
            output,
            template,
            format,
            limit,
            from,
            since,
            until,
            oldest_first,
        }) => {
            assert_eq!(repos, vec![PathBuf::from("/repos/one"), PathBuf::from("/repos/two")]);
            assert_eq!(ReportFormat::resolve(format, &output), ReportFormat::Json);
            assert!(template.is_none());
            assert_eq!(limit, Some(50));
            assert_eq!(from.as_deref(), Some("main"));
            assert_eq!(
                since.map(|d| d.to_rfc3339()),
                Some("2024-01-01T00:00:00+00:00".to_string())
            );
            assert!(until.is_none());
            assert!(oldest_first);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_report_explicit_format() {
    let config = Config::try_parse_from([
        "commitsheet",
        "report",
        "--repo",
        ".",
        "-o",
        "history.dat",
        "--format",
        "json",
    ])
    .expect("parse should succeed");

    match config.command {
        Some(Command::Report { format, .. }) => assert_eq!(format, Some(ReportFormat::Json)),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_report_requires_repo_and_output() {
    assert!(Config::try_parse_from(["commitsheet", "report", "-o", "x.xlsx"]).is_err());
    assert!(Config::try_parse_from(["commitsheet", "report", "--repo", "."]).is_err());
}

#[test]
fn test_report_rejects_bad_date() {
    let result = Config::try_parse_from([
        "commitsheet",
        "report",
        "--repo",
        ".",
        "-o",
        "x.xlsx",
        "--since",
        "last tuesday",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_report_missing_repository_rejected_by_validate() {
    let config = Config::try_parse_from([
        "commitsheet",
        "report",
        "--repo",
        "/nonexistent/path/12345",
        "-o",
        "x.xlsx",
    ])
    .expect("parse should succeed");

    assert!(matches!(
        config.validate(),
        Err(ConfigError::RepositoryNotFound(_))
    ));
}
