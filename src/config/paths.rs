// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path configuration.
//!
//! ```text
//! $HOME/Code/mirrors/
//!   registry.txt          paths.registry
//!   github/<owner>/<name> paths.mirrors = mirrors root
//!   gitlab/...
//! ```
//!
//! Values are kept as written and expanded (`$VAR`, `${VAR}`, leading `~/`)
//! on access.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utility::path::expand_path;

/// Registry file and mirrors root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Registry file, one `provider:owner/name` per line.
    pub registry: String,
    /// Root directory holding every mirror.
    pub mirrors: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            registry: "$HOME/Code/mirrors/registry.txt".to_string(),
            mirrors: "$HOME/Code/mirrors".to_string(),
        }
    }
}

impl PathsConfig {
    /// Expanded registry path.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        expand_path(&self.registry)
    }

    /// Expanded mirrors root.
    #[must_use]
    pub fn mirrors_root(&self) -> PathBuf {
        expand_path(&self.mirrors)
    }
}
