// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use tokio::fs;

use crate::error::{FsError, MirrorResult};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> FsError + '_ {
    move |source| FsError::IoError {
        path: path.display().to_string(),
        source,
    }
}

/// Recursively copies all contents from `src` into `dst` (async version).
///
/// Creates `dst` if it doesn't exist. Symlinks are followed, so a dangling
/// link is an error. Returns the number of files copied.
///
/// # Example
/// ```no_run
/// use making_mirrors::utility::fs::copy::copy_dir_contents_async;
/// use std::path::Path;
///
/// # async fn example() -> making_mirrors::error::MirrorResult<()> {
/// copy_dir_contents_async(Path::new("/mirrors/github/o/r"), Path::new("/tmp/r")).await?;
/// # Ok(())
/// # }
/// ```
/// # Errors
///
/// Returns [`FsError::IoError`] naming the path of the first failed operation.
pub async fn copy_dir_contents_async(src: &Path, dst: &Path) -> MirrorResult<u64> {
    fs::create_dir_all(dst).await.map_err(io_error(dst))?;

    let mut entries = fs::read_dir(src).await.map_err(io_error(src))?;
    let mut copied = 0;

    while let Some(entry) = entries.next_entry().await.map_err(io_error(src))? {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type().await.map_err(io_error(&src_path))?;

        if file_type.is_dir() {
            copied += Box::pin(copy_dir_contents_async(&src_path, &dst_path)).await?;
        } else {
            fs::copy(&src_path, &dst_path)
                .await
                .map_err(io_error(&src_path))?;
            copied += 1;
        }
    }

    Ok(copied)
}
