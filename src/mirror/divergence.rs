// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup, reset and rollback after an upstream history rewrite.
//!
//! ```text
//!   live mirror M                       states on disk
//!        |
//!   create_dir(M.backup.<ts>)           M            (nothing else)
//!   copy M -> B, verify refs/           M + partial B
//!   update-ref <primary> <old> in B
//!        | fail: remove B ---------> BackupFailed     M
//!        v
//!   ls-remote origin <primary>          M + B
//!   update-ref <primary> <oid>
//!        | ok ------------------> UpdatedDiverged     M(reset) + B kept
//!        v fail
//!   remove M, rename B -> M
//!        | ok ------------------> ResetFailed         M(restored)
//!        v fail
//!   RollbackFailed (fatal)                            B intact, M maybe gone
//! ```
//!
//! The copy is taken after the fetch, so the backup's primary ref is set
//! back to the discarded tip before anything touches the live mirror. A
//! rollback therefore restores the pre-divergence primary branch.
//!
//! At no point are both the live mirror and an intact backup absent.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{error, info, warn};

use super::{MirrorLocation, UpdateOutcome, has_refs_marker};
use crate::error::{FsError, MirrorError, MirrorResult, SyncError};
use crate::git::client::GitClient;
use crate::utility::fs::copy::copy_dir_contents_async;
use crate::utility::fs::remove::{discard_partial_dir, remove_dir_all_if_exists};

/// A rewrite of the primary ref detected by the update step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Full name of the ref `HEAD` points to.
    pub primary_ref: String,
    /// Primary ref tip before the update.
    pub discarded_tip: String,
    /// Commits reachable only from the old tip.
    pub local_only: u64,
    /// Commits reachable only from the new tip.
    pub remote_only: u64,
}

/// Runs the guarded backup-then-reset sequence for one mirror.
pub struct DivergenceHandler<'a> {
    git: &'a GitClient,
}

impl<'a> DivergenceHandler<'a> {
    #[must_use]
    pub const fn new(git: &'a GitClient) -> Self {
        Self { git }
    }

    /// Backs the mirror up, then forces its primary ref to the remote's.
    ///
    /// # Errors
    ///
    /// - [`SyncError::BackupFailed`]: nothing destructive was attempted.
    /// - [`SyncError::ResetFailed`]: the mirror was restored from the backup.
    /// - [`SyncError::RollbackFailed`]: restoring failed; the backup is left in place.
    pub async fn recover(
        &self,
        location: &MirrorLocation,
        divergence: Divergence,
    ) -> Result<UpdateOutcome, SyncError> {
        let backup = create_backup(location, OffsetDateTime::now_utc())
            .await
            .map_err(|e| SyncError::BackupFailed {
                cause: e.to_string(),
            })?;
        if let Err(e) = self
            .git
            .update_ref(&backup, &divergence.primary_ref, &divergence.discarded_tip)
            .await
        {
            discard_partial_dir(&backup).await;
            return Err(SyncError::BackupFailed {
                cause: format!("cannot restore {} in backup: {e}", divergence.primary_ref),
            });
        }
        info!(
            backup = %backup.display(),
            primary = %divergence.primary_ref,
            tip = %divergence.discarded_tip,
            "mirror backed up"
        );

        let reset_error = match self.reset_primary(location.path(), &divergence.primary_ref).await {
            Ok(oid) => {
                info!(
                    path = %location.path().display(),
                    primary = %divergence.primary_ref,
                    new_tip = %oid,
                    discarded_tip = %divergence.discarded_tip,
                    "primary ref reset to remote"
                );
                return Ok(UpdateOutcome::UpdatedDiverged {
                    backup: file_name(&backup),
                    discarded_tip: Some(divergence.discarded_tip),
                });
            }
            Err(e) => e,
        };

        warn!(path = %location.path().display(), error = %reset_error, "reset failed, restoring backup");
        match rollback(location.path(), &backup).await {
            Ok(()) => Err(SyncError::ResetFailed {
                cause: reset_error.to_string(),
            }),
            Err(rollback_error) => {
                error!(
                    path = %location.path().display(),
                    backup = %backup.display(),
                    error = %rollback_error,
                    "rollback failed, manual recovery needed"
                );
                Err(SyncError::RollbackFailed {
                    backup: backup.display().to_string(),
                    cause: format!("{reset_error}; rollback: {rollback_error}"),
                })
            }
        }
    }

    async fn reset_primary(&self, repo: &Path, primary_ref: &str) -> MirrorResult<String> {
        let oid = self.git.remote_ref(repo, primary_ref).await?;
        self.git.update_ref(repo, primary_ref, &oid).await?;
        Ok(oid)
    }
}

/// Copies the mirror to `<name>.backup.<YYYYMMDD-HHMMSS>` (UTC) next to it.
///
/// The backup directory must not exist yet. A partially written backup is
/// removed before returning an error.
///
/// # Errors
///
/// Returns an error if the directory exists, the copy fails, or the copy
/// lacks the refs marker.
pub async fn create_backup(location: &MirrorLocation, now: OffsetDateTime) -> MirrorResult<PathBuf> {
    let stamp = now
        .format(format_description!("[year][month][day]-[hour][minute][second]"))
        .map_err(|e| MirrorError::Other(e.to_string().into_boxed_str()))?;
    let backup = location.backup_path(&stamp);

    tokio::fs::create_dir(&backup).await.map_err(|source| {
        if source.kind() == ErrorKind::AlreadyExists {
            FsError::AlreadyExists(backup.display().to_string())
        } else {
            FsError::IoError {
                path: backup.display().to_string(),
                source,
            }
        }
    })?;

    if let Err(e) = copy_dir_contents_async(location.path(), &backup).await {
        discard_partial_dir(&backup).await;
        return Err(e);
    }
    if !has_refs_marker(&backup) {
        discard_partial_dir(&backup).await;
        return Err(FsError::NotFound(backup.join("refs").display().to_string()).into());
    }

    Ok(backup)
}

/// Replaces the live mirror with its backup.
async fn rollback(live: &Path, backup: &Path) -> MirrorResult<()> {
    remove_dir_all_if_exists(live).await?;
    tokio::fs::rename(backup, live)
        .await
        .map_err(|source| FsError::IoError {
            path: backup.display().to_string(),
            source,
        })?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
