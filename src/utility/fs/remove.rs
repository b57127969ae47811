// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::warn;

use crate::error::{FsError, MirrorResult};

/// Removes a directory tree; a missing directory is not an error.
///
/// # Errors
///
/// Returns [`FsError::IoError`] if the tree exists but cannot be removed.
pub async fn remove_dir_all_if_exists(path: &Path) -> MirrorResult<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FsError::IoError {
            path: path.display().to_string(),
            source,
        }
        .into()),
    }
}

/// Best-effort cleanup of a partially written directory; failures are logged.
pub async fn discard_partial_dir(path: &Path) {
    if let Err(e) = remove_dir_all_if_exists(path).await {
        warn!(path = %path.display(), error = %e, "failed to remove partial directory");
    }
}
