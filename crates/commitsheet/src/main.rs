//! commitsheet: clone git repositories and export their history
//!
//! This binary crate clones or pulls remote repositories and writes one
//! spreadsheet row per file changed by each commit.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use commitsheet::config::{self, Command, Config, ReportFormat};
use commitsheet::report::Reporter;
use commitsheet_git::{CloneResult, Fetcher, RepositorySource, text_progress};
use commitsheet_report::{ExcelSink, JsonSink, ReportSink};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    match run(&config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch the subcommand; `Ok(false)` means it ran but something failed
fn run(config: &Config) -> Result<bool> {
    config.validate().context("Invalid arguments")?;

    let Some(command) = &config.command else {
        Config::command().print_help()?;
        return Ok(true);
    };

    match command {
        Command::Clone {
            url,
            path,
            username,
            password,
        } => {
            let checkout = config::checkout_path(url, path.as_deref())
                .with_context(|| format!("No checkout directory for {url}"))?;
            let source = RepositorySource::new(
                url.as_str(),
                config::credentials(username.as_deref(), password.as_deref()),
                checkout,
            );
            let outcome = fetcher(config).clone_or_pull(&source);
            info!(url = %url, outcome = ?outcome, "Done");
            Ok(outcome.is_success())
        }
        Command::CloneMany {
            urls,
            paths,
            username,
            password,
        } => {
            let credentials = config::credentials(username.as_deref(), password.as_deref());
            let results = fetcher(config).clone_many(urls, paths, &credentials)?;
            let failed = results
                .iter()
                .filter(|r| matches!(r, CloneResult::TransportFailed(_)))
                .count();
            info!(total = results.len(), failed, "Batch clone finished");
            Ok(failed == 0)
        }
        Command::Report {
            repos,
            output,
            template,
            format,
            limit,
            from,
            since,
            until,
            oldest_first,
        } => {
            let format = ReportFormat::resolve(*format, output);
            let sink: Box<dyn ReportSink> = match (format, template) {
                (ReportFormat::Xlsx, Some(template)) => {
                    Box::new(ExcelSink::with_template(template))
                }
                (ReportFormat::Xlsx, None) => Box::new(ExcelSink::new()),
                (ReportFormat::Json, template) => {
                    if template.is_some() {
                        warn!("Templates only apply to xlsx output, ignoring --template");
                    }
                    Box::new(JsonSink::new())
                }
            };

            let options =
                config::walk_options(*limit, from.as_deref(), *since, *until, *oldest_first);
            let mut reporter = Reporter::new(sink);
            let stats = reporter.add_repositories(repos, &options);
            let written = reporter.finish(output);

            info!(
                commits = stats.commits,
                rows = stats.rows,
                failed_commits = stats.failed_commits,
                failed_repositories = stats.failed_repositories,
                "Report finished"
            );
            Ok(written && stats.failed_repositories == 0)
        }
    }
}

fn fetcher(config: &Config) -> Fetcher {
    if config.quiet {
        Fetcher::new()
    } else {
        Fetcher::new().with_progress(text_progress())
    }
}
