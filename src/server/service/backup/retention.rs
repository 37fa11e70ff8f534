//! Removal of expired backup archives.

use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use walkdir::WalkDir;

use crate::server::error::backup::BackupError;

/// Deletes every archive under `<backups_dir>/<tenant>/` last modified before `max_age` ago.
///
/// Leftover `.partial` files are expired the same way. Files that cannot be inspected or
/// removed are logged and skipped.
///
/// # Returns
/// - `Ok(usize)` - Number of deleted files
/// - `Err(BackupError)` - The pruning task panicked
pub async fn prune_backups(backups_dir: &Path, max_age: Duration) -> Result<usize, BackupError> {
    let backups_dir = backups_dir.to_path_buf();

    tokio::task::spawn_blocking(move || prune_blocking(&backups_dir, max_age))
        .await
        .map_err(|e| BackupError::io("prune backups")(std::io::Error::other(e)))
}

fn prune_blocking(backups_dir: &Path, max_age: Duration) -> usize {
    let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
        return 0;
    };

    expired_files(backups_dir, cutoff)
        .into_iter()
        .filter(|path| match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::info!("Removed expired backup {}", path.display());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to remove expired backup {}: {}", path.display(), e);
                false
            }
        })
        .count()
}

fn expired_files(backups_dir: &Path, cutoff: SystemTime) -> Vec<PathBuf> {
    if !backups_dir.exists() {
        return Vec::new();
    }

    WalkDir::new(backups_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable backup entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .metadata()
                .ok()
                .and_then(|metadata| metadata.modified().ok())
                .is_some_and(|modified| modified < cutoff)
        })
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn write_aged(path: &Path, age: Duration) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "archive").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::now() - age)
            .unwrap();
    }

    #[tokio::test]
    async fn removes_only_archives_past_cutoff() {
        let root = tempfile::tempdir().unwrap();
        let old_a = root.path().join("tenant-a/backup_20250101000000.tdb");
        let fresh_a = root.path().join("tenant-a/backup_20260101000000.tdb");
        let old_b = root.path().join("tenant-b/backup_20250101000000.tdb.partial");
        write_aged(&old_a, DAY * 40);
        write_aged(&fresh_a, DAY * 2);
        write_aged(&old_b, DAY * 31);

        let removed = prune_backups(root.path(), DAY * 30).await.unwrap();

        assert_eq!(removed, 2);
        assert!(!old_a.exists());
        assert!(!old_b.exists());
        assert!(fresh_a.exists());
    }

    #[tokio::test]
    async fn ignores_files_outside_tenant_directories() {
        let root = tempfile::tempdir().unwrap();
        let stray = root.path().join("README");
        write_aged(&stray, DAY * 100);

        let removed = prune_backups(root.path(), DAY).await.unwrap();

        assert_eq!(removed, 0);
        assert!(stray.exists());
    }

    #[tokio::test]
    async fn missing_backup_root_prunes_nothing() {
        let root = tempfile::tempdir().unwrap();

        let removed = prune_backups(&root.path().join("none"), DAY).await.unwrap();

        assert_eq!(removed, 0);
    }
}
