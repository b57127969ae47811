// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::copy::copy_dir_contents_async;
use super::remove::{discard_partial_dir, remove_dir_all_if_exists};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

#[tokio::test]
async fn test_copy_dir_contents_recursive() {
    let temp = temp_dir();
    let src = temp.path().join("mirror");
    std::fs::create_dir_all(src.join("refs/heads")).unwrap();
    std::fs::create_dir_all(src.join("objects/pack")).unwrap();
    std::fs::write(src.join("HEAD"), "ref: refs/heads/main\n").unwrap();
    std::fs::write(src.join("refs/heads/main"), "abc\n").unwrap();

    let dst = temp.path().join("backup");
    let copied = copy_dir_contents_async(&src, &dst).await.unwrap();

    assert_eq!(copied, 2);
    assert_eq!(
        std::fs::read_to_string(dst.join("refs/heads/main")).unwrap(),
        "abc\n"
    );
    assert!(dst.join("objects/pack").is_dir(), "empty dirs are kept");
}

#[tokio::test]
async fn test_copy_dir_contents_missing_source() {
    let temp = temp_dir();
    let err = copy_dir_contents_async(&temp.path().join("nope"), &temp.path().join("dst"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_copy_dir_contents_fails_on_dangling_symlink() {
    let temp = temp_dir();
    let src = temp.path().join("src");
    std::fs::create_dir(&src).unwrap();
    std::os::unix::fs::symlink(temp.path().join("missing"), src.join("link")).unwrap();

    assert!(
        copy_dir_contents_async(&src, &temp.path().join("dst"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_remove_dir_all_if_exists() {
    let temp = temp_dir();
    let dir = temp.path().join("a/b");
    std::fs::create_dir_all(&dir).unwrap();

    remove_dir_all_if_exists(&temp.path().join("a")).await.unwrap();
    assert!(!temp.path().join("a").exists());

    // second removal is a no-op
    remove_dir_all_if_exists(&temp.path().join("a")).await.unwrap();
    discard_partial_dir(&temp.path().join("a")).await;
}
