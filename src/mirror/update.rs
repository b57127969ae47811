// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Refreshing an existing mirror and classifying what changed.
//!
//! ```text
//! before = for-each-ref      (failure tolerated)
//! remote update              (failure => RemoteUpdateFailed, stop)
//! after  = for-each-ref      (failure tolerated)
//!
//! either snapshot missing    => UpdatedFastForward
//! before == after            => AlreadyUpToDate
//! primary ref moved and
//!   rev-list old...new has
//!   commits on both sides    => diverged, DivergenceHandler
//! otherwise                  => UpdatedFastForward
//! ```
//!
//! The primary ref is whatever `HEAD` points to. Only that ref is checked
//! for divergence; rewritten side branches classify as fast-forward.

use std::path::Path;
use tracing::{debug, info, warn};

use super::divergence::{Divergence, DivergenceHandler};
use super::{MirrorLocation, UpdateOutcome};
use crate::error::SyncError;
use crate::git::client::GitClient;
use crate::git::refs::RefSnapshot;

/// Updates a present mirror from its remote.
///
/// # Errors
///
/// [`SyncError::RemoteUpdateFailed`] if the remote update fails; any error
/// from the divergence handler when a rewrite is detected.
pub async fn update_mirror(
    git: &GitClient,
    location: &MirrorLocation,
    handler: &DivergenceHandler<'_>,
) -> Result<UpdateOutcome, SyncError> {
    let path = location.path();

    let before = git.list_refs(path).await;
    git.remote_update(path)
        .await
        .map_err(|e| SyncError::RemoteUpdateFailed {
            cause: e.to_string(),
        })?;
    let after = git.list_refs(path).await;

    let (before, after) = match (before, after) {
        (Ok(before), Ok(after)) => (before, after),
        (before, after) => {
            warn!(
                path = %path.display(),
                before_error = ?before.err().map(|e| e.to_string()),
                after_error = ?after.err().map(|e| e.to_string()),
                "ref listing failed, skipping change classification"
            );
            return Ok(UpdateOutcome::UpdatedFastForward { significant: false });
        }
    };

    if before == after {
        debug!(path = %path.display(), refs = after.len(), "no ref changes");
        return Ok(UpdateOutcome::AlreadyUpToDate);
    }

    if let Some(divergence) = detect_divergence(git, path, &before, &after).await {
        info!(
            path = %path.display(),
            primary = %divergence.primary_ref,
            local_only = divergence.local_only,
            remote_only = divergence.remote_only,
            "history rewritten upstream"
        );
        return handler.recover(location, divergence).await;
    }

    Ok(UpdateOutcome::UpdatedFastForward {
        significant: is_significant(&before, &after),
    })
}

/// Ref count moved by more than a tenth of the previous count.
#[must_use]
pub fn is_significant(before: &RefSnapshot, after: &RefSnapshot) -> bool {
    before.len().abs_diff(after.len()) > before.len() / 10
}

/// Checks the primary ref for commits on both sides of the update.
///
/// Every failure along the way (detached `HEAD`, ref missing on one side,
/// `rev-list` error) reads as "not diverged".
pub async fn detect_divergence(
    git: &GitClient,
    repo: &Path,
    before: &RefSnapshot,
    after: &RefSnapshot,
) -> Option<Divergence> {
    let primary_ref = match git.head_ref(repo).await {
        Ok(Some(name)) => name,
        Ok(None) => return None,
        Err(e) => {
            warn!(path = %repo.display(), error = %e, "cannot resolve HEAD");
            return None;
        }
    };

    let old = before.get(&primary_ref)?;
    let new = after.get(&primary_ref)?;
    if old == new {
        return None;
    }

    match git.left_right_count(repo, old, new).await {
        Ok((local_only, remote_only)) if local_only > 0 && remote_only > 0 => Some(Divergence {
            primary_ref,
            discarded_tip: old.to_string(),
            local_only,
            remote_only,
        }),
        Ok(_) => None,
        Err(e) => {
            warn!(path = %repo.display(), error = %e, "divergence check failed");
            None
        }
    }
}
