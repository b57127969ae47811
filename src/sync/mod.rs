// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Worker pool that brings every registry entry up to date.
//!
//! ```text
//!  descriptors --> work queue (flume, filled then closed)
//!                    |      |      |
//!                 worker worker worker      W = effective_workers(jobs, N)
//!                    |      |      |        one descriptor at a time each
//!                  sync_one (catch_unwind)
//!                    |      |      |
//!                  result channel (flume)   closes when the last worker exits
//!                           |
//!                     OutcomeStream -> SyncReport
//! ```
//!
//! Descriptors sharing a mirror location are collapsed to the first one
//! before the queue is filled. Each remaining descriptor is received by
//! exactly one worker, so no two workers ever touch the same location.

mod report;

pub use report::SyncReport;

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bon::Builder;
use futures_util::FutureExt;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::SyncError;
use crate::git::client::GitClient;
use crate::mirror::{MirrorLocation, UpdateOutcome, sync_one};
use crate::registry::RepoDescriptor;

/// One finished descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRecord {
    pub repo: RepoDescriptor,
    pub outcome: UpdateOutcome,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(elapsed.as_millis())
}

/// Synchronization pass over a fixed set of descriptors.
#[derive(Clone, Builder)]
pub struct SyncEngine {
    #[builder(setters(name = with_git))]
    git: GitClient,
    /// Mirrors root; must exist.
    #[builder(into, setters(name = with_root))]
    root: PathBuf,
    /// Requested workers; 0 means one per available processing unit.
    #[builder(default, setters(name = with_jobs))]
    jobs: usize,
}

impl SyncEngine {
    /// Starts one worker pool over `repos` and returns its outcomes as they
    /// complete.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn run(&self, repos: Vec<RepoDescriptor>) -> OutcomeStream {
        let repos = self.distinct_locations(repos);
        let total = repos.len();
        let workers = effective_workers(self.jobs, total);
        info!(repos = total, workers, "starting sync pass");

        let (work_tx, work_rx) = flume::unbounded();
        for repo in repos {
            if let Err(flume::SendError(repo)) = work_tx.send(repo) {
                error!(repo = %repo, "work queue closed, descriptor not scheduled");
            }
        }
        drop(work_tx);

        let (result_tx, result_rx) = flume::unbounded();
        let root = Arc::new(self.root.clone());
        for worker in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let git = self.git.clone();
            let root = Arc::clone(&root);
            tokio::spawn(async move {
                while let Ok(repo) = work_rx.recv_async().await {
                    let record = process(&git, &root, repo).await;
                    if result_tx.send_async(record).await.is_err() {
                        debug!(worker, "outcome stream dropped, worker exiting");
                        break;
                    }
                }
                debug!(worker, "worker finished");
            });
        }

        OutcomeStream {
            rx: result_rx,
            total,
        }
    }

    /// Keeps the first descriptor for each mirror location.
    fn distinct_locations(&self, repos: Vec<RepoDescriptor>) -> Vec<RepoDescriptor> {
        let mut seen = HashSet::with_capacity(repos.len());
        repos
            .into_iter()
            .filter(|repo| {
                let fresh = seen.insert(MirrorLocation::new(&self.root, repo));
                if !fresh {
                    warn!(repo = %repo, "duplicate descriptor for one mirror location, skipping");
                }
                fresh
            })
            .collect()
    }
}

async fn process(git: &GitClient, root: &std::path::Path, repo: RepoDescriptor) -> SyncRecord {
    let started = Instant::now();
    let outcome = match AssertUnwindSafe(sync_one(git, root, &repo)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            let cause = panic_message(payload.as_ref());
            error!(repo = %repo, cause = %cause, "worker panicked");
            UpdateOutcome::Failed(SyncError::WorkerPanicked { cause })
        }
    };
    let elapsed = started.elapsed();
    if outcome.is_success() {
        info!(repo = %repo, outcome = outcome.label(), elapsed_ms = elapsed.as_millis(), "synced");
    } else {
        error!(repo = %repo, error = %outcome, "sync failed");
    }
    SyncRecord {
        repo,
        outcome,
        elapsed,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Worker count for `total` descriptors: `jobs`, or the available
/// parallelism when `jobs` is 0, clamped to `[1, total]`.
#[must_use]
pub fn effective_workers(jobs: usize, total: usize) -> usize {
    let requested = if jobs == 0 {
        std::thread::available_parallelism().map_or(4, NonZeroUsize::get)
    } else {
        jobs
    };
    requested.min(total).max(1)
}

/// Outcomes of a running pass, in completion order.
pub struct OutcomeStream {
    rx: flume::Receiver<SyncRecord>,
    total: usize,
}

impl OutcomeStream {
    /// Number of descriptors in the pass.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Next finished descriptor; `None` once every worker has exited.
    pub async fn recv(&self) -> Option<SyncRecord> {
        self.rx.recv_async().await.ok()
    }

    /// Waits for the whole pass.
    pub async fn collect_all(self) -> Vec<SyncRecord> {
        let mut records = Vec::with_capacity(self.total);
        while let Some(record) = self.recv().await {
            records.push(record);
        }
        records
    }
}

#[cfg(test)]
mod tests;
