// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! List command implementation.

use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::error::Result;
use crate::mirror::{MirrorLocation, inspect};
use crate::registry::{RepoDescriptor, read_registry};

/// `<entry>  <state>  <url>  <path>` per descriptor, columns aligned.
#[must_use]
pub fn format_entries(repos: &[RepoDescriptor], root: &Path) -> Vec<String> {
    let width = repos
        .iter()
        .map(|repo| repo.to_string().len())
        .max()
        .unwrap_or(0);

    repos
        .iter()
        .map(|repo| {
            let location = MirrorLocation::new(root, repo);
            format!(
                "{:<width$}  {:<7}  {}  {}",
                repo.to_string(),
                inspect(&location),
                repo.url(),
                location.path().display()
            )
        })
        .collect()
}

/// Main handler for the list command. Read-only.
///
/// # Errors
///
/// Returns an error if the registry cannot be read.
pub fn run_list_command(config: &Config) -> Result<()> {
    let registry = config.paths.registry_path();
    let repos = read_registry(&registry, &config.url_templates())
        .with_context(|| format!("cannot load registry {}", registry.display()))?;

    if repos.is_empty() {
        println!("No repositories in {}", registry.display());
        return Ok(());
    }
    for line in format_entries(&repos, &config.paths.mirrors_root()) {
        println!("{line}");
    }
    Ok(())
}
