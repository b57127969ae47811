// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Serialize;
use std::fmt;

use crate::error::SyncError;

/// Abbreviation length for object ids in human-readable output.
const SHORT_OID_LEN: usize = 12;

/// Result of bringing one mirror up to date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// A new mirror was created.
    Cloned,
    /// Remote update changed no refs.
    AlreadyUpToDate,
    /// Refs changed without rewriting the primary branch.
    ///
    /// `significant` is set when the ref count moved by more than a tenth.
    UpdatedFastForward { significant: bool },
    /// The primary branch was rewritten upstream; local history was
    /// discarded after saving a backup next to the mirror.
    UpdatedDiverged {
        /// Backup directory name, a sibling of the mirror.
        backup: String,
        /// Primary ref tip before the update, still present in the backup.
        discarded_tip: Option<String>,
    },
    /// Terminal failure for this pass.
    Failed(SyncError),
}

impl UpdateOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// True when manual intervention is required.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Failed(e) => e.is_fatal(),
            _ => false,
        }
    }

    /// Short stable label for summaries.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cloned => "cloned",
            Self::AlreadyUpToDate => "up_to_date",
            Self::UpdatedFastForward { .. } => "fast_forward",
            Self::UpdatedDiverged { .. } => "diverged",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloned => f.write_str("Cloned successfully"),
            Self::AlreadyUpToDate => f.write_str("Already up to date"),
            Self::UpdatedFastForward { significant: true } => {
                f.write_str("Updated (significant changes detected)")
            }
            Self::UpdatedFastForward { significant: false } => f.write_str("Updated successfully"),
            Self::UpdatedDiverged {
                backup,
                discarded_tip: None,
            } => write!(f, "Updated (force-push detected, backup saved as {backup})"),
            Self::UpdatedDiverged {
                backup,
                discarded_tip: Some(tip),
            } => {
                let short = tip.get(..SHORT_OID_LEN).unwrap_or(tip);
                write!(
                    f,
                    "Updated (force-push detected, backup saved as {backup}, previous tip {short})"
                )
            }
            Self::Failed(e) => write!(f, "{e}"),
        }
    }
}
