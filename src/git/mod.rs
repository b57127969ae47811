// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!        mirror / sync
//!              |
//!              v
//!      ,----------------,
//!      |   GitClient    |   typed ops, non-zero exit => GitError
//!      '-------+--------'
//!              | &Invocation
//!              v
//!   Arc<dyn CommandInvoker>
//!        |            |
//!        v            v
//!  ShellInvoker    test fakes
//!  (git CLI)
//!
//!   RefSnapshot  parsed for-each-ref listing
//! ```
//!
//! Git is treated as a black box: exit status is the success signal and
//! only ref listings, `symbolic-ref`, `rev-list --count` and `ls-remote`
//! output are parsed.

pub mod client;
pub mod invoker;
pub mod refs;
