// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shell-style path expansion.
//!
//! ```text
//! "$HOME/Code/mirrors"   --> /home/me/Code/mirrors
//! "${XDG_DATA}/m"        --> /home/me/.local/share/m
//! "~/mirrors"            --> /home/me/mirrors
//! "$UNDEFINED/x"         --> /x          (undefined expands to "")
//! ```

use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))").ok()
});

/// Expands `$VAR`, `${VAR}` and a leading `~/` using the process environment.
#[must_use]
pub fn expand_path(input: &str) -> PathBuf {
    expand_path_with(input, |name| std::env::var(name).ok(), dirs::home_dir())
}

/// Expansion with an explicit variable lookup and home directory.
///
/// Variables are expanded first, then `~/`, so `$VAR` may itself yield a `~/` path.
pub fn expand_path_with(
    input: &str,
    lookup: impl Fn(&str) -> Option<String>,
    home: Option<PathBuf>,
) -> PathBuf {
    let expanded = ENV_VAR.as_ref().map_or_else(
        || input.to_string(),
        |re| {
            re.replace_all(input, |caps: &Captures<'_>| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .and_then(|name| lookup(name.as_str()))
                    .unwrap_or_default()
            })
            .into_owned()
        },
    );

    match (expanded.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(expanded),
    }
}

/// Expands a path that came in as a `Path` (e.g. from clap or serde).
#[must_use]
pub fn expand(path: &Path) -> PathBuf {
    expand_path(&path.to_string_lossy())
}
