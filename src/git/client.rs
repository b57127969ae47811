// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed git operations for bare mirrors.
//!
//! ```text
//!  operation            git command                              deadline
//!  -------------------  ---------------------------------------  --------
//!  clone_mirror         clone --mirror --quiet <url> <dest>      network
//!  remote_update        remote update                            network
//!  remote_ref           ls-remote --exit-code origin <ref>       network
//!  list_refs            for-each-ref --format=...                local
//!  head_ref             symbolic-ref -q HEAD                     local
//!  left_right_count     rev-list --left-right --count a...b      local
//!  update_ref           update-ref <ref> <oid>                   local
//! ```

use bon::Builder;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::invoker::{CommandInvoker, Invocation, InvocationOutput};
use super::refs::RefSnapshot;
use crate::error::{GitError, MirrorResult};

const REF_FORMAT: &str = "--format=%(objectname) %(refname)";

/// Git operations routed through a [`CommandInvoker`].
#[derive(Clone, Builder)]
pub struct GitClient {
    #[builder(setters(name = with_invoker))]
    invoker: Arc<dyn CommandInvoker>,
    /// Deadline for commands that talk to a remote.
    #[builder(setters(name = with_network_timeout))]
    network_timeout: Option<Duration>,
    /// Deadline for commands that only touch the local mirror.
    #[builder(setters(name = with_local_timeout))]
    local_timeout: Option<Duration>,
}

impl GitClient {
    /// Client without deadlines.
    pub fn new(invoker: Arc<dyn CommandInvoker>) -> Self {
        Self::builder().with_invoker(invoker).build()
    }

    /// Creates a bare mirror of `url` at `dest`. The parent of `dest` must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot run or exits non-zero.
    pub async fn clone_mirror(&self, url: &str, dest: &Path) -> MirrorResult<()> {
        let mut invocation = Invocation::git([
            "clone".to_string(),
            "--mirror".to_string(),
            "--quiet".to_string(),
            url.to_string(),
            dest.to_string_lossy().into_owned(),
        ])
        .with_timeout(self.network_timeout);
        if let Some(parent) = dest.parent() {
            invocation = invocation.in_dir(parent);
        }
        self.run(&invocation).await.map(drop)
    }

    /// Fetches every remote of the mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot run or exits non-zero.
    pub async fn remote_update(&self, repo: &Path) -> MirrorResult<()> {
        let invocation = Invocation::git(["remote", "update"])
            .in_dir(repo)
            .with_timeout(self.network_timeout);
        self.run(&invocation).await.map(drop)
    }

    /// Lists every ref of the mirror. An empty mirror yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if git fails or prints an unparsable line.
    pub async fn list_refs(&self, repo: &Path) -> MirrorResult<RefSnapshot> {
        let invocation = Invocation::git(["for-each-ref", REF_FORMAT])
            .in_dir(repo)
            .with_timeout(self.local_timeout);
        let output = self.run(&invocation).await?;
        RefSnapshot::parse(output.stdout())
    }

    /// Full name of the ref `HEAD` points to, or `None` if `HEAD` is detached.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot run or fails for another reason.
    pub async fn head_ref(&self, repo: &Path) -> MirrorResult<Option<String>> {
        let invocation = Invocation::git(["symbolic-ref", "-q", "HEAD"])
            .in_dir(repo)
            .with_timeout(self.local_timeout);
        let output = self.invoker.invoke(&invocation).await?;
        match output.exit_code() {
            0 => {
                let name = output.stdout().trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            // -q: exit 1 without a message when HEAD is not symbolic
            1 => Ok(None),
            _ => Err(command_failed(&invocation, &output).into()),
        }
    }

    /// Counts commits only reachable from `left` and only reachable from `right`.
    ///
    /// # Errors
    ///
    /// Returns an error if git fails (e.g. an object is missing) or the output
    /// is not two counts.
    pub async fn left_right_count(
        &self,
        repo: &Path,
        left: &str,
        right: &str,
    ) -> MirrorResult<(u64, u64)> {
        let range = format!("{left}...{right}");
        let invocation = Invocation::git([
            "rev-list".to_string(),
            "--left-right".to_string(),
            "--count".to_string(),
            range,
        ])
        .in_dir(repo)
        .with_timeout(self.local_timeout);
        let output = self.run(&invocation).await?;

        let mut counts = output.stdout().split_whitespace().map(str::parse::<u64>);
        match (counts.next(), counts.next(), counts.next()) {
            (Some(Ok(l)), Some(Ok(r)), None) => Ok((l, r)),
            _ => Err(GitError::UnexpectedOutput {
                command: invocation.to_string(),
                output: output.stdout().trim().to_string(),
            }
            .into()),
        }
    }

    /// Object id `name` points to on the `origin` remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote is unreachable or has no such ref.
    pub async fn remote_ref(&self, repo: &Path, name: &str) -> MirrorResult<String> {
        let invocation = Invocation::git([
            "ls-remote".to_string(),
            "--exit-code".to_string(),
            "origin".to_string(),
            name.to_string(),
        ])
        .in_dir(repo)
        .with_timeout(self.network_timeout);
        let output = self.run(&invocation).await?;

        // ls-remote patterns match ref suffixes; keep the exact name only.
        output
            .stdout()
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .find(|(_, refname)| refname.trim() == name)
            .map(|(oid, _)| oid.trim().to_string())
            .ok_or_else(|| {
                GitError::UnexpectedOutput {
                    command: invocation.to_string(),
                    output: output.stdout().trim().to_string(),
                }
                .into()
            })
    }

    /// Points `name` at `oid` unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot run or exits non-zero.
    pub async fn update_ref(&self, repo: &Path, name: &str, oid: &str) -> MirrorResult<()> {
        let invocation = Invocation::git(["update-ref", name, oid])
            .in_dir(repo)
            .with_timeout(self.local_timeout);
        self.run(&invocation).await.map(drop)
    }

    /// Invokes and maps a non-zero exit to [`GitError::CommandFailed`].
    async fn run(&self, invocation: &Invocation) -> MirrorResult<InvocationOutput> {
        let output = self.invoker.invoke(invocation).await?;
        if output.succeeded() {
            Ok(output)
        } else {
            Err(command_failed(invocation, &output).into())
        }
    }
}

fn command_failed(invocation: &Invocation, output: &InvocationOutput) -> GitError {
    let stderr = output.stderr().trim();
    let message = if stderr.is_empty() {
        format!("exit code {}", output.exit_code())
    } else {
        stderr.to_string()
    };
    GitError::CommandFailed {
        command: invocation.to_string(),
        message,
    }
}
