// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! fs
//!   copy:    copy_dir_contents_async()
//!   remove:  remove_dir_all_if_exists(), discard_partial_dir()
//! path
//!   expand_path()  $VAR / ${VAR} / ~/ expansion
//! ```

pub mod fs;
pub mod path;
