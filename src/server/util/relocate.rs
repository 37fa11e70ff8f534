//! Asset tree relocation.
//!
//! Moves a freshly extracted asset tree into the live asset directory of a tenant. The new
//! tree is first brought next to the destination as `<dst>.incoming` (by rename when source
//! and destination share a device, by copying otherwise) and only then swapped in, so the
//! live directory is either the old tree or the complete new one.

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::server::error::backup::AssetCopyError;

const INCOMING_SUFFIX: &str = ".incoming";
const OUTGOING_SUFFIX: &str = ".outgoing";

/// Replaces `dst` with the tree at `src`.
///
/// `src` is consumed: it is either renamed away or left behind for its owner to clean up.
///
/// # Returns
/// - `Ok(())` - `dst` now holds exactly the files of `src`
/// - `Err(AssetCopyError::Files)` - Some files could not be copied; `dst` is untouched
/// - `Err(AssetCopyError::Relocate)` - Preparing or swapping the directories failed
pub async fn move_or_copy_tree(src: &Path, dst: &Path) -> Result<(), AssetCopyError> {
    let src = src.to_path_buf();
    let dst = dst.to_path_buf();

    tokio::task::spawn_blocking(move || move_or_copy_blocking(&src, &dst)).await?
}

fn move_or_copy_blocking(src: &Path, dst: &Path) -> Result<(), AssetCopyError> {
    let incoming = sibling(dst, INCOMING_SUFFIX);
    let outgoing = sibling(dst, OUTGOING_SUFFIX);

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(relocate_error(parent))?;
    }
    remove_stale(&incoming)?;
    remove_stale(&outgoing)?;

    if let Err(e) = fs::rename(src, &incoming) {
        tracing::debug!(
            "Rename of {} failed ({}), copying asset tree",
            src.display(),
            e
        );

        let failures = copy_tree(src, &incoming);
        if !failures.is_empty() {
            if let Err(e) = fs::remove_dir_all(&incoming) {
                tracing::warn!("Failed to remove {}: {}", incoming.display(), e);
            }
            return Err(AssetCopyError::Files(failures));
        }
    }

    swap_into_place(&incoming, dst, &outgoing)
}

fn swap_into_place(incoming: &Path, dst: &Path, outgoing: &Path) -> Result<(), AssetCopyError> {
    let had_previous = dst.exists();
    if had_previous {
        fs::rename(dst, outgoing).map_err(relocate_error(dst))?;
    }

    if let Err(e) = fs::rename(incoming, dst) {
        if had_previous {
            if let Err(restore) = fs::rename(outgoing, dst) {
                tracing::error!(
                    "Failed to restore previous assets {}: {}",
                    dst.display(),
                    restore
                );
            }
        }
        return Err(relocate_error(dst)(e));
    }

    if had_previous {
        if let Err(e) = fs::remove_dir_all(outgoing) {
            tracing::warn!("Failed to remove previous assets {}: {}", outgoing.display(), e);
        }
    }

    Ok(())
}

/// Copies every file and directory below `src` into `dst`.
///
/// Each file is written under a temporary name and renamed once complete. Copying goes on
/// after a failure so that every failing path is reported at once.
///
/// # Returns
/// - Every path that could not be copied with its error, empty on success
pub fn copy_tree(src: &Path, dst: &Path) -> Vec<(PathBuf, io::Error)> {
    let mut failures = Vec::new();

    if let Err(e) = fs::create_dir_all(dst) {
        failures.push((dst.to_path_buf(), e));
        return failures;
    }

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(src).to_path_buf();
                failures.push((path, io::Error::from(e)));
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        let result = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            copy_file(entry.path(), &target)
        };

        if let Err(e) = result {
            failures.push((entry.path().to_path_buf(), e));
        }
    }

    failures
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = sibling(to, ".tmp");
    let result = fs::copy(from, &tmp).and_then(|_| fs::rename(&tmp, to));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }

    result
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_stale(path: &Path) -> Result<(), AssetCopyError> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::warn!("Removed leftover asset directory {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(relocate_error(path)(e)),
    }
}

fn relocate_error(path: &Path) -> impl FnOnce(io::Error) -> AssetCopyError {
    let path = path.to_path_buf();
    move |source| AssetCopyError::Relocate { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replaces_existing_destination() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("extracted");
        let dst = root.path().join("assets/tenant-a");

        fs::create_dir_all(src.join("ads")).unwrap();
        fs::write(src.join("ads/new.png"), "new").unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("old.png"), "old").unwrap();

        move_or_copy_tree(&src, &dst).await.unwrap();

        assert_eq!(fs::read_to_string(dst.join("ads/new.png")).unwrap(), "new");
        assert!(!dst.join("old.png").exists());
        assert!(!sibling(&dst, INCOMING_SUFFIX).exists());
        assert!(!sibling(&dst, OUTGOING_SUFFIX).exists());
    }

    #[tokio::test]
    async fn creates_missing_destination() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("extracted");
        let dst = root.path().join("assets/tenant-b");
        fs::create_dir_all(src.join("empty")).unwrap();

        move_or_copy_tree(&src, &dst).await.unwrap();

        assert!(dst.join("empty").is_dir());
    }

    #[tokio::test]
    async fn clears_leftover_incoming_directory() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("extracted");
        let dst = root.path().join("assets/tenant-a");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();

        let stale = sibling(&dst, INCOMING_SUFFIX);
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("stale.txt"), "stale").unwrap();

        move_or_copy_tree(&src, &dst).await.unwrap();

        assert!(dst.join("a.txt").exists());
        assert!(!dst.join("stale.txt").exists());
    }

    #[test]
    fn copies_tree_file_by_file() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::create_dir_all(src.join("empty")).unwrap();
        fs::write(src.join("a/b/c.bin"), [1, 2, 3]).unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();

        let failures = copy_tree(&src, &dst);

        assert!(failures.is_empty());
        assert_eq!(fs::read(dst.join("a/b/c.bin")).unwrap(), vec![1, 2, 3]);
        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
        assert!(dst.join("empty").is_dir());
        assert!(!dst.join("top.txt.tmp").exists());
    }

    #[test]
    fn reports_every_failed_path() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        fs::create_dir_all(src.join("images")).unwrap();
        fs::write(src.join("images/logo.png"), "logo").unwrap();
        fs::write(src.join("ok.txt"), "ok").unwrap();

        // A file where a directory must go blocks the whole subtree
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("images"), "in the way").unwrap();

        let failures = copy_tree(&src, &dst);

        let failed: Vec<&Path> = failures.iter().map(|(path, _)| path.as_path()).collect();
        assert!(failed.contains(&src.join("images").as_path()));
        assert!(failed.contains(&src.join("images/logo.png").as_path()));
        assert_eq!(fs::read_to_string(dst.join("ok.txt")).unwrap(), "ok");
    }
}
