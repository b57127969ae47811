// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::registry::{Provider, UrlTemplates};
use crate::test_utils::fake_git::{FakeGit, Failure, MAIN};
use crate::test_utils::logs::with_captured_logs;

fn repos(fake: &FakeGit, count: usize) -> Vec<RepoDescriptor> {
    (0..count)
        .map(|i| {
            let repo = RepoDescriptor::new(
                Provider::Github,
                format!("owner{}", i % 3),
                format!("repo{i}"),
                &UrlTemplates::default(),
            );
            fake.create_remote(repo.url());
            repo
        })
        .collect()
}

fn engine(fake: &Arc<FakeGit>, root: &std::path::Path, jobs: usize) -> SyncEngine {
    SyncEngine::builder()
        .with_git(GitClient::new(fake.clone()))
        .with_root(root)
        .with_jobs(jobs)
        .build()
}

#[test]
fn test_effective_workers() {
    assert_eq!(effective_workers(4, 20), 4);
    assert_eq!(effective_workers(8, 3), 3);
    assert_eq!(effective_workers(4, 0), 1);
    assert!(effective_workers(0, 1000) >= 1);
    assert_eq!(effective_workers(0, 1), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_descriptor_yields_exactly_one_outcome() {
    let temp = tempfile::tempdir().unwrap();
    let fake = FakeGit::with_delay(Duration::from_millis(5));
    let repos = repos(&fake, 20);

    let stream = engine(&fake, temp.path(), 4).run(repos.clone());
    assert_eq!(stream.total(), 20);
    let records = stream.collect_all().await;

    assert_eq!(records.len(), 20);
    let seen: BTreeSet<_> = records.iter().map(|r| r.repo.to_string()).collect();
    let expected: BTreeSet<_> = repos.iter().map(ToString::to_string).collect();
    assert_eq!(seen, expected);
    assert!(records.iter().all(|r| r.outcome == UpdateOutcome::Cloned));
    assert!(!fake.saw_overlap(), "two invocations touched one mirror at once");
    assert!(fake.max_in_flight() <= 4, "{}", fake.max_in_flight());
    assert!(fake.max_in_flight() > 1, "workers never ran concurrently");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_descriptor_is_synced_once() {
    let temp = tempfile::tempdir().unwrap();
    let fake = FakeGit::with_delay(Duration::from_millis(20));
    let mut repos = repos(&fake, 2);
    repos.push(repos[0].clone());
    repos.push(repos[0].clone());

    let (stream, logs) = with_captured_logs(|| engine(&fake, temp.path(), 4).run(repos));
    assert_eq!(stream.total(), 2);
    let records = stream.collect_all().await;

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.outcome == UpdateOutcome::Cloned));
    assert!(!fake.saw_overlap(), "two invocations touched one mirror at once");
    assert_eq!(fake.subcommands_at("repo0"), ["clone"]);
    assert!(logs.contains("duplicate descriptor"), "{logs}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_second_pass_is_up_to_date_without_clones() {
    let temp = tempfile::tempdir().unwrap();
    let fake = FakeGit::new();
    let repos = repos(&fake, 6);

    engine(&fake, temp.path(), 3).run(repos.clone()).collect_all().await;
    let clones_after_first = fake.subcommands_at("repo").iter().filter(|s| *s == "clone").count();
    let records = engine(&fake, temp.path(), 3).run(repos).collect_all().await;

    assert!(records.iter().all(|r| r.outcome == UpdateOutcome::AlreadyUpToDate));
    let clones = fake.subcommands_at("repo").iter().filter(|s| *s == "clone").count();
    assert_eq!(clones, clones_after_first);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failures_are_isolated_per_descriptor() {
    let temp = tempfile::tempdir().unwrap();
    let fake = FakeGit::new();
    let repos = repos(&fake, 5);
    fake.fail_at("clone", "repo2", Failure::Exit(128));
    fake.fail_at("clone", "repo4", Failure::Panic);

    let records = engine(&fake, temp.path(), 2).run(repos).collect_all().await;
    let report = SyncReport::from_records(&records);

    assert_eq!(records.len(), 5);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 2);
    assert!(!report.has_fatal());
    let panicked = records.iter().find(|r| r.repo.name() == "repo4").unwrap();
    assert!(
        matches!(
            &panicked.outcome,
            UpdateOutcome::Failed(SyncError::WorkerPanicked { cause }) if cause.contains("injected panic")
        ),
        "{:?}",
        panicked.outcome
    );
}

#[tokio::test]
async fn test_empty_pass_closes_immediately() {
    let temp = tempfile::tempdir().unwrap();
    let fake = FakeGit::new();

    let records = engine(&fake, temp.path(), 0).run(Vec::new()).collect_all().await;

    assert!(records.is_empty());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_diverged_mirror_in_pool() {
    let temp = tempfile::tempdir().unwrap();
    let fake = FakeGit::new();
    let repos = repos(&fake, 2);
    let engine = engine(&fake, temp.path(), 2);
    engine.run(repos.clone()).collect_all().await;
    fake.push(repos[0].url(), MAIN);
    engine.run(repos.clone()).collect_all().await;
    fake.force_push(repos[0].url(), MAIN);

    let records = engine.run(repos).collect_all().await;
    let report = SyncReport::from_records(&records);

    assert_eq!(report.by_outcome.get("diverged"), Some(&1));
    assert_eq!(report.by_outcome.get("up_to_date"), Some(&1));
}

fn record(name: &str, outcome: UpdateOutcome) -> SyncRecord {
    SyncRecord {
        repo: RepoDescriptor::new(Provider::Github, "torvalds", name, &UrlTemplates::default()),
        outcome,
        elapsed: Duration::from_millis(1500),
    }
}

#[test]
fn test_report_text() {
    let records = [
        record("linux", UpdateOutcome::Cloned),
        record(
            "subsurface",
            UpdateOutcome::Failed(SyncError::RemoteUpdateFailed {
                cause: "exit code 128".to_string(),
            }),
        ),
        record(
            "uemacs",
            UpdateOutcome::Failed(SyncError::RollbackFailed {
                backup: "/m/uemacs.backup.20260102-030405".to_string(),
                cause: "reset; rollback: busy".to_string(),
            }),
        ),
    ];
    let report = SyncReport::from_records(&records);
    let mut lines: Vec<_> = records.iter().map(SyncReport::text_line).collect();
    lines.push(report.summary_line());

    insta::assert_snapshot!(lines.join("\n"), @r"
    ✓ torvalds/linux: Cloned successfully
    ✗ torvalds/subsurface: remote update failed: exit code 128
    ✗ torvalds/uemacs: force-push handling failed and rollback failed, manual recovery needed (backup: /m/uemacs.backup.20260102-030405): reset; rollback: busy
    Completed! Successfully mirrored 1/3 repositories
    ");
    assert!(report.has_fatal());
    assert_eq!(report.fatal, 1);
}

#[test]
fn test_report_json() {
    let cloned = record("linux", UpdateOutcome::Cloned);
    let report = SyncReport::from_records([&cloned]);

    insta::assert_snapshot!(SyncReport::json_line(&cloned).unwrap(), @r#"{"repo":{"provider":"github","owner":"torvalds","name":"linux","url":"https://github.com/torvalds/linux.git"},"outcome":{"outcome":"cloned"},"elapsed_ms":1500}"#);
    insta::assert_snapshot!(report.json_summary().unwrap(), @r#"{"summary":{"total":1,"succeeded":1,"failed":0,"fatal":0,"by_outcome":{"cloned":1}}}"#);
}
