// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config layers --> Logging --> Command Dispatch
//!   Sync (default) | List | Options | Version
//! ```

use std::process::ExitCode;

use making_mirrors::cli::sync::SyncArgs;
use making_mirrors::cli::{self, Command};
use making_mirrors::cmd::config::{LoadedConfig, load_config, log_config, run_options_command};
use making_mirrors::cmd::list::run_list_command;
use making_mirrors::cmd::sync::run_sync_command;
use making_mirrors::logging::init_logging;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    if matches!(cli.command, Some(Command::Version)) {
        handle_version_command();
        return ExitCode::SUCCESS;
    }

    let overrides = match &cli.command {
        Some(Command::Sync(args)) => args.to_config_overrides(),
        Some(Command::List(args)) => args.location.to_config_overrides(),
        _ => Vec::new(),
    };

    let loaded = match load_config(&cli.global, &overrides) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&log_config(&loaded.config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(cli.command.as_ref(), &loaded).await
}

async fn dispatch_command(command: Option<&Command>, loaded: &LoadedConfig) -> ExitCode {
    let default_sync = SyncArgs::default();
    let result = match command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(true)
        }
        Some(Command::Options) => {
            run_options_command(loaded);
            Ok(true)
        }
        Some(Command::List(_)) => run_list_command(&loaded.config).map(|()| true),
        Some(Command::Sync(args)) => run_sync_command(args, &loaded.config)
            .await
            .map(|report| !report.has_fatal()),
        None => run_sync_command(&default_sync, &loaded.config)
            .await
            .map(|report| !report.has_fatal()),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("Error: at least one mirror needs manual recovery");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}
