// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for making-mirrors.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. mirrors.toml (cwd, optional)
//! 3. --config (repeatable)
//! 4. MIRRORS_* env vars
//! 5. --set KEY=VALUE
//! 6. CLI flags
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! MIRRORS_SYNC__JOBS=8            → sync.jobs = 8
//! MIRRORS_PATHS__MIRRORS=/srv/m   → paths.mirrors = "/srv/m"
//! MIRRORS_PROVIDERS__GITEA=...    → providers.gitea = "..."
//! ```
//!
//! # Provider URL Templates
//!
//! ```toml
//! [providers]
//! gitea = "https://git.example.org/{owner}/{name}.git"
//! ```

pub mod loader;
pub mod paths;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::registry::{Provider, UrlTemplates};

use loader::ConfigLoader;
use paths::PathsConfig;
use types::{GitConfig, GlobalConfig, SyncConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Registry and mirrors root.
    pub paths: PathsConfig,
    /// Worker pool and deadlines.
    pub sync: SyncConfig,
    /// Git executable.
    pub git: GitConfig,
    /// Per-provider URL template overrides.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<Provider, String>,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use making_mirrors::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("mirrors.toml")
    ///     .with_env_prefix("MIRRORS")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::InvalidValue`] for an empty path, an empty git
    /// program, or a provider template without `{name}`.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("registry", &self.paths.registry),
            ("mirrors", &self.paths.mirrors),
        ] {
            if value.trim().is_empty() {
                return Err(invalid("paths", key, "must not be empty").into());
            }
        }
        if self.git.program.trim().is_empty() {
            return Err(invalid("git", "program", "must not be empty").into());
        }
        for (provider, template) in &self.providers {
            if !template.contains("{name}") {
                return Err(invalid(
                    "providers",
                    provider.as_str(),
                    "template must contain {name}",
                )
                .into());
            }
        }
        Ok(())
    }

    /// URL templates with this configuration's overrides applied.
    #[must_use]
    pub fn url_templates(&self) -> UrlTemplates {
        UrlTemplates::with_overrides(self.providers.clone())
    }

    /// Format configuration options for display.
    ///
    /// One `key = value` line per option, sorted by key, with the effective
    /// template shown for every provider.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();

        options.insert(
            "global.output_log_level".to_string(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".to_string(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".to_string(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );

        options.insert("paths.registry".to_string(), self.paths.registry.clone());
        options.insert("paths.mirrors".to_string(), self.paths.mirrors.clone());

        options.insert("sync.jobs".to_string(), self.sync.jobs.to_string());
        options.insert(
            "sync.network_timeout_secs".to_string(),
            self.sync.network_timeout_secs.to_string(),
        );
        options.insert(
            "sync.local_timeout_secs".to_string(),
            self.sync.local_timeout_secs.to_string(),
        );

        options.insert("git.program".to_string(), self.git.program.clone());

        let templates = self.url_templates();
        for provider in Provider::ALL {
            options.insert(
                format!("providers.{provider}"),
                templates.template(provider).to_string(),
            );
        }

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}

fn invalid(section: &str, key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.to_string(),
    }
}
