// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync command implementation.
//!
//! ```text
//! config --> registry --> create mirrors root --> SyncEngine::run
//!                                                      |
//!                         progress bar (stderr) <-- each record --> report line (stdout)
//!                                                      |
//!                                                 summary line
//! ```

use std::io::IsTerminal;
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::cli::sync::{OutputFormat, SyncArgs};
use crate::config::Config;
use crate::error::Result;
use crate::git::client::GitClient;
use crate::git::invoker::{CommandInvoker, ShellInvoker};
use crate::registry::read_registry;
use crate::sync::{SyncEngine, SyncRecord, SyncReport};

fn bar_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        })
        .clone()
}

fn progress_bar(total: usize, enabled: bool) -> ProgressBar {
    if !enabled || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    pb.set_style(bar_style());
    pb
}

/// One report line for `record` in `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_record(record: &SyncRecord, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => SyncReport::text_line(record),
        OutputFormat::Json => SyncReport::json_line(record)?,
    })
}

/// Final report line in `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_summary(report: &SyncReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => report.summary_line(),
        OutputFormat::Json => report.json_summary()?,
    })
}

/// Git client for `config`, running the configured git program.
#[must_use]
pub fn git_client(config: &Config) -> GitClient {
    let invoker: Arc<dyn CommandInvoker> = Arc::new(ShellInvoker::with_program(&config.git.program));
    GitClient::builder()
        .with_invoker(invoker)
        .maybe_with_network_timeout(config.sync.network_timeout())
        .maybe_with_local_timeout(config.sync.local_timeout())
        .build()
}

/// Main handler for the sync command.
///
/// Routine per-repository failures are part of the returned report; only
/// setup failures are errors.
///
/// # Errors
///
/// Returns an error if the registry cannot be read or the mirrors root
/// cannot be created.
pub async fn run_sync_command(args: &SyncArgs, config: &Config) -> Result<SyncReport> {
    let registry = config.paths.registry_path();
    let repos = read_registry(&registry, &config.url_templates())
        .with_context(|| format!("cannot load registry {}", registry.display()))?;
    if repos.is_empty() {
        warn!(registry = %registry.display(), "registry has no entries");
    }

    let root = config.paths.mirrors_root();
    tokio::fs::create_dir_all(&root)
        .await
        .with_context(|| format!("cannot create mirrors root {}", root.display()))?;

    let engine = SyncEngine::builder()
        .with_git(git_client(config))
        .with_root(root)
        .with_jobs(config.sync.jobs)
        .build();

    let stream = engine.run(repos);
    let progress = progress_bar(stream.total(), !args.no_progress);
    let mut report = SyncReport::default();

    while let Some(record) = stream.recv().await {
        report.record(&record);
        let line = render_record(&record, args.format)?;
        progress.suspend(|| println!("{line}"));
        progress.set_message(record.repo.slug());
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!("{}", render_summary(&report, args.format)?);
    Ok(report)
}
