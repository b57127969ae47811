// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities for mirror backups.
//!
//! ```text
//! copy:    copy_dir_contents_async()   recursive tokio::fs copy
//! remove:  remove_dir_all_if_exists()  missing dir is Ok
//!          discard_partial_dir()       best effort, logs on failure
//! ```

pub mod copy;
pub mod remove;

#[cfg(test)]
mod tests;
