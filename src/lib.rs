// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |             sync / list / options
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, env, --set layers |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!             registry      sync      git
//!           entries/URLs  worker   invoker/client
//!                          pool        |
//!                           |          |
//!                           v          |
//!                        mirror <------'
//!                clone / update / divergence
//!
//!   +-----------------------------------------+
//!   |  core   process spawning                |
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod error;
pub mod git;
pub mod logging;
pub mod mirror;
pub mod registry;
pub mod sync;
pub mod utility;

#[cfg(test)]
mod test_utils;
