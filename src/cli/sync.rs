// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for `sync` and `list`.

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Registry and mirrors root overrides shared by `sync` and `list`.
#[derive(Debug, Clone, Default, Args)]
pub struct LocationArgs {
    /// Registry file (paths.registry).
    #[arg(short = 'i', long = "input", value_name = "REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Mirrors root directory (paths.mirrors).
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub mirrors: Option<PathBuf>,
}

impl LocationArgs {
    /// `KEY=VALUE` overrides for the configuration loader.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();
        if let Some(ref path) = self.registry {
            overrides.push(format!("paths.registry={}", path.display()));
        }
        if let Some(ref path) = self.mirrors {
            overrides.push(format!("paths.mirrors={}", path.display()));
        }
        overrides
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `✓`/`✗` line per repository and a summary.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Arguments for the `sync` command.
#[derive(Debug, Clone, Default, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Concurrent workers; 0 uses every available processing unit (sync.jobs).
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Hides the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl SyncArgs {
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = self.location.to_config_overrides();
        if let Some(jobs) = self.jobs {
            overrides.push(format!("sync.jobs={jobs}"));
        }
        overrides
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub location: LocationArgs,
}
