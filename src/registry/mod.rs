// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository registry: the list of repositories to mirror.
//!
//! ```text
//! registry.txt                     RepoDescriptor
//! ------------------------         ------------------------------------
//! # comment          (skipped)
//! github:torvalds/linux    ---->   github / torvalds / linux
//! gitlab:org/tool.git      ---->   gitlab / org / tool   (.git dropped)
//! gitlab:org/tool    (repeat, warn, skipped)
//! bogus line         (warn, skipped)
//!
//! url = UrlTemplates[provider] with {owner} {name} {region} filled in
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::RegistryError;

/// Hosting provider of a repository.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Gitlab,
    Bitbucket,
    Gitea,
    Codecommit,
    Azure,
}

impl Provider {
    pub const ALL: [Self; 6] = [
        Self::Github,
        Self::Gitlab,
        Self::Bitbucket,
        Self::Gitea,
        Self::Codecommit,
        Self::Azure,
    ];

    /// Registry tag, also used as the first path component under the mirrors root.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::Gitea => "gitea",
            Self::Codecommit => "codecommit",
            Self::Azure => "azure",
        }
    }

    /// Built-in fetch URL template.
    #[must_use]
    pub const fn default_template(self) -> &'static str {
        match self {
            Self::Github => "https://github.com/{owner}/{name}.git",
            Self::Gitlab => "https://gitlab.com/{owner}/{name}.git",
            Self::Bitbucket => "https://bitbucket.org/{owner}/{name}.git",
            Self::Gitea => "https://gitea.com/{owner}/{name}.git",
            Self::Codecommit => "https://git-codecommit.{region}.amazonaws.com/v1/repos/{name}",
            Self::Azure => "https://dev.azure.com/{owner}/{name}/_git/{name}",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RegistryError::UnsupportedProvider {
                provider: s.to_string(),
            })
    }
}

/// Fetch URL template per provider.
///
/// Placeholders: `{owner}`, `{name}`, `{region}`. For `CodeCommit` the region
/// is the part after the dash when the owner is `<account>-<region>`, else
/// the whole owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlTemplates {
    overrides: BTreeMap<Provider, String>,
}

impl UrlTemplates {
    /// Templates with the given per-provider overrides applied.
    #[must_use]
    pub const fn with_overrides(overrides: BTreeMap<Provider, String>) -> Self {
        Self { overrides }
    }

    #[must_use]
    pub fn template(&self, provider: Provider) -> &str {
        self.overrides
            .get(&provider)
            .map_or_else(|| provider.default_template(), String::as_str)
    }

    /// Renders the fetch URL for one repository.
    #[must_use]
    pub fn render(&self, provider: Provider, owner: &str, name: &str) -> String {
        let region = match owner.split('-').collect::<Vec<_>>().as_slice() {
            [_, region] => *region,
            _ => owner,
        };
        self.template(provider)
            .replace("{owner}", owner)
            .replace("{region}", region)
            .replace("{name}", name)
    }
}

/// Identity and fetch URL of one remote repository.
///
/// The URL is derived at construction and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoDescriptor {
    provider: Provider,
    owner: String,
    name: String,
    url: String,
}

impl RepoDescriptor {
    pub fn new(
        provider: Provider,
        owner: impl Into<String>,
        name: impl Into<String>,
        templates: &UrlTemplates,
    ) -> Self {
        let owner = owner.into();
        let name = name.into();
        let url = templates.render(provider, &owner, &name);
        Self {
            provider,
            owner,
            name,
            url,
        }
    }

    #[must_use]
    pub const fn provider(&self) -> Provider {
        self.provider
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `owner/name`, as shown in the report.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.provider, self.owner, self.name)
    }
}

/// Parses one `provider:owner/name[.git]` registry entry.
///
/// # Errors
///
/// - [`RegistryError::InvalidFormat`] without a `:`.
/// - [`RegistryError::InvalidPath`] unless the path is exactly two non-empty
///   components (`.` and `..` are rejected too).
/// - [`RegistryError::UnsupportedProvider`] for an unknown provider tag.
pub fn parse_line(line: &str, templates: &UrlTemplates) -> Result<RepoDescriptor, RegistryError> {
    let (provider, path) = line
        .split_once(':')
        .ok_or_else(|| RegistryError::InvalidFormat {
            line: line.to_string(),
        })?;

    let trimmed = path.strip_suffix(".git").unwrap_or(path);
    let (owner, name) = match trimmed.split('/').collect::<Vec<_>>().as_slice() {
        [owner, name] if is_path_component(owner) && is_path_component(name) => (*owner, *name),
        _ => {
            return Err(RegistryError::InvalidPath {
                path: path.to_string(),
            });
        }
    };

    let provider = provider.parse::<Provider>()?;
    Ok(RepoDescriptor::new(provider, owner, name, templates))
}

fn is_path_component(part: &str) -> bool {
    !part.is_empty() && part != "." && part != ".."
}

/// Reads every valid entry of a registry file, in file order.
///
/// Blank lines and lines starting with `#` are skipped. Lines that fail to
/// parse are logged and skipped.
///
/// # Errors
///
/// Returns [`RegistryError::ReadFailed`] if the file cannot be read.
pub fn read_registry(
    path: &Path,
    templates: &UrlTemplates,
) -> Result<Vec<RepoDescriptor>, RegistryError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_registry(&content, templates))
}

/// Parses registry text; see [`read_registry`].
///
/// Entries naming the same provider, owner and name as an earlier line are
/// logged and skipped, so `github:a/b` and `github:a/b.git` yield one entry.
#[must_use]
pub fn parse_registry(content: &str, templates: &UrlTemplates) -> Vec<RepoDescriptor> {
    let mut seen = HashSet::new();
    let repos: Vec<_> = content
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            match parse_line(line, templates) {
                Ok(repo) if seen.insert(repo.clone()) => Some(repo),
                Ok(_) => {
                    warn!(line_number = index + 1, line = %line, "skipping duplicate registry entry");
                    None
                }
                Err(e) => {
                    warn!(line_number = index + 1, line = %line, error = %e, "skipping registry entry");
                    None
                }
            }
        })
        .collect();
    debug!(count = repos.len(), "registry parsed");
    repos
}
