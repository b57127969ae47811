// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! [global]   output_log_level, file_log_level, log_file
//! [sync]     jobs, network_timeout_secs, local_timeout_secs
//! [git]      program
//! ```
//!
//! A timeout of `0` disables that deadline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Worker pool and deadline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Worker count; 0 uses every available processing unit.
    pub jobs: usize,
    /// Deadline for clone, remote update and ls-remote.
    pub network_timeout_secs: u64,
    /// Deadline for commands that only read or write the local mirror.
    pub local_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            network_timeout_secs: 3600,
            local_timeout_secs: 300,
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub const fn network_timeout(&self) -> Option<Duration> {
        secs(self.network_timeout_secs)
    }

    #[must_use]
    pub const fn local_timeout(&self) -> Option<Duration> {
        secs(self.local_timeout_secs)
    }
}

const fn secs(value: u64) -> Option<Duration> {
    if value == 0 {
        None
    } else {
        Some(Duration::from_secs(value))
    }
}

/// Git executable settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Name looked up in `PATH`, or a path to the binary.
    pub program: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}
