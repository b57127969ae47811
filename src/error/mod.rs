// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            MirrorError (~24 bytes)
//!                     |
//!   +------+------+---+---+------+------+
//!   |      |      |       |      |      |
//!   v      v      v       v      v      v
//!  Git    Cfg    Reg    Proc    Fs   Io/Other
//!  Box    Box    Box    Box     Box  Box/Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Git      CommandFailed, UnexpectedOutput
//!   Config   InvalidValue
//!   Registry InvalidFormat, InvalidPath, UnsupportedProvider
//!   Process  SpawnFailed, NonZeroExit, Timeout
//!   Fs       NotFound, AlreadyExists, IoError
//!
//! SyncError is not part of MirrorError: it is the
//! per-repository failure reason carried by UpdateOutcome.
//! ```

use serde::Serialize;
use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`MirrorError`].
pub type MirrorResult<T> = std::result::Result<T, MirrorError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Registry parsing or loading error.
    #[error("registry error: {0}")]
    Registry(#[from] Box<RegistryError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for MirrorError {
                fn from(err: $error) -> Self {
                    MirrorError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    ConfigError => Config,
    RegistryError => Registry,
    ProcessError => Process,
    FsError => Fs,
    std::io::Error => Io,
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command exited with a non-zero status.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Git succeeded but printed something we could not interpret.
    #[error("unexpected output from {command}: {output}")]
    UnexpectedOutput { command: String, output: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Registry Errors ---

/// Errors produced while reading the repository registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Line is not `provider:owner/name`.
    #[error("invalid format '{line}': expected provider:owner/name")]
    InvalidFormat { line: String },

    /// Path part does not have exactly two non-empty components.
    #[error("invalid repository path '{path}': expected owner/name")]
    InvalidPath { path: String },

    /// Provider tag is not one of the known providers.
    #[error("unsupported provider '{provider}'")]
    UnsupportedProvider { provider: String },

    /// Registry file could not be opened or read.
    #[error("failed to read registry '{path}': {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with non-zero status.
    #[error("process '{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// Process timed out and was killed.
    #[error("process '{command}' timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },

    /// Failed to wait on the process or read its output.
    #[error("failed to read output from process '{command}': {message}")]
    OutputError { command: String, message: String },
}

// --- Filesystem Errors ---

/// Filesystem operation errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("path not found: {0}")]
    NotFound(String),

    /// Destination already exists and must not be overwritten.
    #[error("path already exists: {0}")]
    AlreadyExists(String),

    /// General I/O error.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Sync Errors ---

/// Terminal failure reason for one repository in one synchronization pass.
///
/// Cloneable so it can travel inside an outcome record; causes are kept as
/// rendered strings for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncError {
    /// Parent directories for a new mirror could not be created.
    #[error("failed to create directory '{path}': {cause}")]
    DirectoryCreationFailed { path: String, cause: String },

    /// Mirror-mode clone failed.
    #[error("clone failed: {cause}")]
    CloneFailed { cause: String },

    /// Remote update of an existing mirror failed.
    #[error("remote update failed: {cause}")]
    RemoteUpdateFailed { cause: String },

    /// Backup before a destructive reset could not be created.
    #[error("backup failed: {cause}")]
    BackupFailed { cause: String },

    /// Reset failed; the mirror was restored from its backup.
    #[error("force-push handling failed: {cause}")]
    ResetFailed { cause: String },

    /// Reset failed and restoring the backup failed too.
    #[error(
        "force-push handling failed and rollback failed, manual recovery needed (backup: {backup}): {cause}"
    )]
    RollbackFailed { backup: String, cause: String },

    /// Processing panicked before an outcome was produced.
    #[error("worker panicked: {cause}")]
    WorkerPanicked { cause: String },
}

impl SyncError {
    /// Returns true when the mirror needs manual intervention.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::RollbackFailed { .. })
    }
}
