// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-repository mirror operations.
//!
//! ```text
//!  RepoDescriptor --> MirrorLocation  <root>/<provider>/<owner>/<name>
//!                           |
//!                        inspect()    refs/ present?
//!                      /          \
//!                 Absent          Present
//!                   |                |
//!            clone_mirror()    update_mirror()
//!                   |           snapshot, remote update, snapshot
//!                   |           /        |           \
//!                Cloned   UpToDate  FastForward   diverged?
//!                                                     |
//!                                            DivergenceHandler
//!                                            backup -> reset
//!                                                 \-> rollback
//! ```
//!
//! Every step returns `Result<UpdateOutcome, SyncError>`; the error side is
//! the terminal `Failed` outcome for that repository.

pub mod clone;
pub mod divergence;
pub mod outcome;
pub mod update;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::git::client::GitClient;
use crate::registry::RepoDescriptor;
use clone::clone_mirror;
use divergence::DivergenceHandler;
pub use outcome::UpdateOutcome;
use update::update_mirror;

/// Directory whose presence marks a bare repository.
const REFS_MARKER: &str = "refs";

/// On-disk location of one mirror, always derived from its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorLocation {
    path: PathBuf,
}

impl MirrorLocation {
    /// `<root>/<provider>/<owner>/<name>`.
    #[must_use]
    pub fn new(root: &Path, repo: &RepoDescriptor) -> Self {
        Self {
            path: root
                .join(repo.provider().as_str())
                .join(repo.owner())
                .join(repo.name()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, the repository name.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Sibling path `<name>.clone-tmp` a fresh clone is written to.
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        self.path.with_file_name(format!("{}.clone-tmp", self.name()))
    }

    /// Sibling path `<name>.backup.<stamp>`.
    #[must_use]
    pub fn backup_path(&self, stamp: &str) -> PathBuf {
        self.path.with_file_name(format!("{}.backup.{stamp}", self.name()))
    }
}

/// Observed state of a mirror location at sync time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorState {
    /// No directory, or a directory without the refs marker.
    Absent,
    /// A bare repository exists; it may be stale.
    Present,
}

impl MirrorState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
        }
    }
}

impl fmt::Display for MirrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classifies a location without touching it.
///
/// Any filesystem error reads as `Absent`. A clone into an existing
/// non-empty directory then fails and leaves the directory untouched.
#[must_use]
pub fn inspect(location: &MirrorLocation) -> MirrorState {
    if has_refs_marker(location.path()) {
        MirrorState::Present
    } else {
        MirrorState::Absent
    }
}

pub(crate) fn has_refs_marker(path: &Path) -> bool {
    std::fs::metadata(path.join(REFS_MARKER)).is_ok_and(|meta| meta.is_dir())
}

/// Brings one mirror up to date: inspect, then clone or update.
pub async fn sync_one(git: &GitClient, root: &Path, repo: &RepoDescriptor) -> UpdateOutcome {
    let location = MirrorLocation::new(root, repo);
    let result = match inspect(&location) {
        MirrorState::Absent => clone_mirror(git, &location, repo).await,
        MirrorState::Present => {
            let handler = DivergenceHandler::new(git);
            update_mirror(git, &location, &handler).await
        }
    };
    result.unwrap_or_else(UpdateOutcome::Failed)
}
