// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loading for commands, and the `options` command.

use std::path::Path;

use crate::cli::global::GlobalOptions;
use crate::config::Config;
use crate::config::loader::ConfigLoader;
use crate::error::Result;
use crate::logging::LogConfig;
use crate::utility::path::expand;

/// Config file picked up from the working directory when present.
pub const LOCAL_CONFIG: &str = "mirrors.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "MIRRORS";

/// A validated configuration and the files it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub sources: Vec<String>,
}

/// Builds the loader for all layers: local file, `--config` files, env,
/// then `overrides` in order.
///
/// # Errors
///
/// Returns an error if an override is not `KEY=VALUE`.
pub fn build_config_loader(
    local_dir: &Path,
    global: &GlobalOptions,
    overrides: &[String],
) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().add_toml_file_optional(local_dir.join(LOCAL_CONFIG));
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);
    for assignment in global.to_config_overrides().iter().chain(overrides) {
        loader = loader.set_from_str(assignment)?;
    }
    Ok(loader)
}

/// Loads the configuration as seen from the current directory.
///
/// # Errors
///
/// Returns an error if any layer fails to load or validate.
pub fn load_config(global: &GlobalOptions, overrides: &[String]) -> Result<LoadedConfig> {
    let loader = build_config_loader(Path::new("."), global, overrides)?;
    let sources = loader.format_loaded_files();
    let config = loader.build()?;
    Ok(LoadedConfig { config, sources })
}

/// Logging settings from the `[global]` section. The log file path is
/// expanded like the other paths.
#[must_use]
pub fn log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(
            config
                .global
                .log_file
                .as_ref()
                .map(|p| expand(p).display().to_string()),
        )
        .build()
}

/// `options` output: loaded files as comments, then every option.
#[must_use]
pub fn format_options(loaded: &LoadedConfig) -> Vec<String> {
    let mut lines: Vec<String> = loaded
        .sources
        .iter()
        .map(|source| format!("# {source}"))
        .collect();
    lines.extend(loaded.config.format_options());
    lines
}

/// Display current configuration options.
pub fn run_options_command(loaded: &LoadedConfig) {
    for line in format_options(loaded) {
        println!("{line}");
    }
}
