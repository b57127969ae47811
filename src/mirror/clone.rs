// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fresh mirror creation.
//!
//! ```text
//!   remove stale <name>.clone-tmp
//!   clear <name> if empty or a leftover bare repo without refs/
//!   git clone --mirror <url> <name>.clone-tmp
//!   rename <name>.clone-tmp -> <name>
//! ```
//!
//! The mirror path only ever receives a complete clone, so a crash mid-clone
//! leaves nothing but the staging directory, which the next pass removes.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};

use super::{MirrorLocation, UpdateOutcome};
use crate::error::SyncError;
use crate::git::client::GitClient;
use crate::registry::RepoDescriptor;
use crate::utility::fs::remove::{discard_partial_dir, remove_dir_all_if_exists};

/// Entries a bare repository may hold before its refs are written.
const BARE_REPO_ENTRIES: &[&str] = &[
    "HEAD",
    "FETCH_HEAD",
    "branches",
    "config",
    "description",
    "hooks",
    "info",
    "logs",
    "objects",
    "packed-refs",
    "shallow",
];

/// Creates parent directories and mirror-clones `repo` into `location`.
///
/// The clone is staged next to the mirror and renamed into place once git
/// succeeds. A directory at the mirror path is only removed when it is empty
/// or holds nothing but bare repository files; anything else is left alone
/// and reported as a clone failure.
///
/// # Errors
///
/// - [`SyncError::DirectoryCreationFailed`] if the parent cannot be created.
/// - [`SyncError::CloneFailed`] if git fails or times out, the staging area
///   cannot be prepared, or the mirror path holds unrelated files.
pub async fn clone_mirror(
    git: &GitClient,
    location: &MirrorLocation,
    repo: &RepoDescriptor,
) -> Result<UpdateOutcome, SyncError> {
    let path = location.path();
    let staging = location.staging_path();

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                cause: e.to_string(),
            })?;
    }

    remove_dir_all_if_exists(&staging)
        .await
        .map_err(|e| clone_failed(format!("cannot clear staging directory: {e}")))?;
    clear_leftover(path).await?;

    debug!(repo = %repo, url = %repo.url(), path = %staging.display(), "cloning");
    if let Err(e) = git.clone_mirror(repo.url(), &staging).await {
        discard_partial_dir(&staging).await;
        return Err(clone_failed(e.to_string()));
    }

    if let Err(e) = tokio::fs::rename(&staging, path).await {
        discard_partial_dir(&staging).await;
        return Err(clone_failed(format!(
            "cannot move clone into {}: {e}",
            path.display()
        )));
    }

    info!(repo = %repo, "cloned");
    Ok(UpdateOutcome::Cloned)
}

/// Makes the mirror path free for the rename, or refuses.
async fn clear_leftover(path: &Path) -> Result<(), SyncError> {
    let mut entries = match tokio::fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(clone_failed(format!("cannot inspect {}: {e}", path.display()))),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| clone_failed(format!("cannot inspect {}: {e}", path.display())))?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    let leftover = names
        .iter()
        .all(|name| BARE_REPO_ENTRIES.contains(&name.as_str()));
    if !leftover {
        return Err(clone_failed(format!(
            "destination path '{}' already exists and is not an empty directory",
            path.display()
        )));
    }

    if !names.is_empty() {
        warn!(path = %path.display(), entries = ?names, "removing interrupted clone");
    }
    remove_dir_all_if_exists(path)
        .await
        .map_err(|e| clone_failed(format!("cannot remove interrupted clone: {e}")))
}

fn clone_failed(cause: String) -> SyncError {
    SyncError::CloneFailed { cause }
}
