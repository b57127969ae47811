// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! External command invocation seam.
//!
//! ```text
//!   GitClient ---- &Invocation ----> dyn CommandInvoker
//!                                        |
//!                         +--------------+-------------+
//!                         v                            v
//!                   ShellInvoker                  (test fakes)
//!                   ProcessBuilder
//!                   GIT_TERMINAL_PROMPT=0
//!                   GCM_INTERACTIVE=never
//! ```
//!
//! `Err` means the command could not be run to completion (missing binary,
//! spawn failure, timeout). A non-zero exit is reported in
//! [`InvocationOutput`], never as `Err`.

use futures_util::future::BoxFuture;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::process::builder::{ProcessBuilder, ProcessFlags};
use crate::error::MirrorResult;

/// One external command: program, arguments, working directory and deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl Invocation {
    /// Creates an invocation of `git` with the given arguments.
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: "git".to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            timeout: None,
        }
    }

    /// Runs the command inside `dir`.
    #[must_use]
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Kills the command if it has not finished after `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// First argument, i.e. the git subcommand.
    #[must_use]
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    #[must_use]
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status and captured streams of a finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOutput {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl InvocationOutput {
    #[must_use]
    pub const fn new(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
        }
    }

    /// Exit code 0 with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout.into(), String::new())
    }

    /// Non-zero exit with the given stderr.
    #[must_use]
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::new(exit_code, String::new(), stderr.into())
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

/// Runs external commands on behalf of [`GitClient`](super::client::GitClient).
///
/// Methods return `BoxFuture` so the trait stays dyn-compatible and can be
/// shared across workers as `Arc<dyn CommandInvoker>`.
pub trait CommandInvoker: Send + Sync {
    /// Runs `invocation` to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be spawned or timed out.
    fn invoke<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> BoxFuture<'a, MirrorResult<InvocationOutput>>;
}

/// Production invoker: spawns real processes through [`ProcessBuilder`].
///
/// Credential prompts are disabled; an unauthenticated remote fails at once.
#[derive(Debug, Clone, Default)]
pub struct ShellInvoker {
    program: Option<String>,
}

impl ShellInvoker {
    /// Invoker that resolves each invocation's program from `PATH`.
    #[must_use]
    pub const fn new() -> Self {
        Self { program: None }
    }

    /// Invoker that runs `program` (a name or a path) in place of `git`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }
}

impl CommandInvoker for ShellInvoker {
    fn invoke<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> BoxFuture<'a, MirrorResult<InvocationOutput>> {
        Box::pin(async move {
            let program = self.program.as_deref().unwrap_or_else(|| invocation.program());
            let mut builder = ProcessBuilder::which(program)?
                .args(invocation.args())
                .env("GIT_TERMINAL_PROMPT", "0")
                .env("GCM_INTERACTIVE", "never")
                .flag(ProcessFlags::ALLOW_FAILURE)
                .capture_output()
                .maybe_timeout(invocation.timeout());
            if let Some(cwd) = invocation.cwd() {
                builder = builder.cwd(cwd);
            }

            let output = builder.run().await?;
            let exit_code = output.exit_code();
            let (stdout, stderr) = output.into_streams();
            Ok(InvocationOutput::new(exit_code, stdout, stderr))
        })
    }
}
