// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for making-mirrors using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! making-mirrors [global options] [command]
//! sync      (default) clone or update every registry entry
//! list      registry entries, URLs and mirror state
//! options   effective configuration
//! version
//! ```

pub mod global;
pub mod sync;


use crate::cli::global::GlobalOptions;
use crate::cli::sync::{ListArgs, SyncArgs};
use clap::{Parser, Subcommand};

/// Bare Mirror Synchronizer
///
/// Keeps local bare mirrors of remote git repositories in sync.
#[derive(Debug, Parser)]
#[command(
    name = "making-mirrors",
    author,
    version,
    about = "Keeps local bare mirrors of remote git repositories in sync",
    long_about = "making-mirrors Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Reads a registry of `provider:owner/name` lines and keeps one\n\
                  bare mirror per entry under <mirrors>/<provider>/<owner>/<name>.\n\
                  Running without a command performs `sync`.",
    after_help = "CONFIGURATION:\n\n\
                  `mirrors.toml` in the current directory is loaded if present.\n\
                  Additional files can be given with --config; later files win.\n\
                  MIRRORS_<SECTION>__<KEY> environment variables and --set\n\
                  override file values, and command flags override everything."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their effective values.
    Options,

    /// Clones missing mirrors and updates existing ones.
    Sync(SyncArgs),

    /// Lists registry entries with their mirror state.
    List(ListArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
