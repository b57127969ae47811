// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core modules for external process management.
//!
//! ```text
//!        core
//!          |
//!          v
//!       process
//!          |
//!   Builder, Output
//!   timeout + kill_on_drop
//! ```

pub mod process;
