//! Client backup and restore.
//!
//! A backup is a zip archive with two members: `db`, the JSON snapshot of every managed
//! collection of the tenant, and `data`, a nested zip of the tenant's asset directory.
//! `BackupService::export` produces one, `BackupService::import` restores one, possibly
//! under a different tenant than the one it was taken from.
//!
//! Every operation holds the tenant's lock from `TenantLocks` for its whole duration and
//! every step runs under the configured step timeout.

pub mod export;
pub mod import;
pub mod lock;
pub mod retention;

#[cfg(test)]
mod test;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

use crate::server::{
    error::backup::{BackupError, UploadError},
    model::{
        backup::{BackupFile, BackupSettings},
        tenant::TenantId,
    },
    service::backup::lock::TenantLocks,
};

pub struct BackupService<'a> {
    db: &'a DatabaseConnection,
    settings: &'a BackupSettings,
    locks: &'a TenantLocks,
}

impl<'a> BackupService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        settings: &'a BackupSettings,
        locks: &'a TenantLocks,
    ) -> Self {
        Self {
            db,
            settings,
            locks,
        }
    }

    /// Rejects uploads whose file name lacks an accepted archive extension.
    pub fn check_extension(&self, filename: &str) -> Result<(), UploadError> {
        if self.settings.accepts(filename) {
            return Ok(());
        }

        Err(UploadError::UnsupportedExtension {
            filename: filename.to_string(),
            allowed: self.settings.extensions.join(", "),
        })
    }

    /// Lists the stored archives of a tenant, newest first.
    ///
    /// # Returns
    /// - `Ok(Vec<BackupFile>)` - Every archive with an accepted extension, empty when the
    ///   tenant has no backup directory
    /// - `Err(BackupError::Io)` - Reading the backup directory failed
    pub async fn list_backups(&self, tenant: &TenantId) -> Result<Vec<BackupFile>, BackupError> {
        let dir = self.settings.tenant_backups(tenant);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackupError::io("list backups")(e)),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(BackupError::io("list backups"))?
        {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !self.settings.accepts(&filename) {
                continue;
            }

            let metadata = entry.metadata().await.map_err(BackupError::io("list backups"))?;
            if !metadata.is_file() {
                continue;
            }

            backups.push(BackupFile {
                url: BackupFile::public_url(tenant, &filename),
                filename,
                path: entry.path(),
                size: metadata.len(),
                created_at: modified_at(&metadata),
            });
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });

        Ok(backups)
    }

    /// Resolves a download request to a stored archive of the caller's tenant.
    ///
    /// `owner` is the tenant named in the download URL. Requests for another tenant's
    /// archives, names that are not plain file names, names without an accepted
    /// extension (such as unfinished `.partial` files), and missing files all resolve to
    /// nothing.
    ///
    /// # Returns
    /// - `Ok(Some(PathBuf))` - Path of the archive to serve
    /// - `Ok(None)` - No such archive for this caller
    /// - `Err(BackupError::Io)` - Inspecting the file failed
    pub async fn backup_path(
        &self,
        tenant: &TenantId,
        owner: &str,
        filename: &str,
    ) -> Result<Option<PathBuf>, BackupError> {
        if owner != tenant.as_str() {
            tracing::debug!("Tenant {} requested a backup of tenant '{}'", tenant, owner);
            return Ok(None);
        }

        let plain_name = Path::new(filename).file_name().and_then(|name| name.to_str());
        if plain_name != Some(filename) || !self.settings.accepts(filename) {
            return Ok(None);
        }

        let path = self.settings.tenant_backups(tenant).join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackupError::io("open backup")(e)),
        }
    }

    /// Runs one step of an export or import under the step timeout.
    ///
    /// Dropping the future on timeout cancels every sub-operation it fanned out.
    async fn timed<T, E, F>(&self, step: &'static str, future: F) -> Result<T, BackupError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<BackupError>,
    {
        match tokio::time::timeout(self.settings.step_timeout, future).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::warn!("Backup step '{}' timed out", step);
                Err(BackupError::Timeout {
                    step,
                    seconds: self.settings.step_timeout.as_secs(),
                })
            }
        }
    }

    /// Creates a scratch directory unique to this operation under the scratch root.
    fn scratch_dir(&self, purpose: &str, tenant: &TenantId) -> Result<TempDir, BackupError> {
        std::fs::create_dir_all(&self.settings.scratch_dir)
            .map_err(BackupError::io("create scratch directory"))?;

        tempfile::Builder::new()
            .prefix(&format!("{}-{}-", purpose, tenant))
            .tempdir_in(&self.settings.scratch_dir)
            .map_err(BackupError::io("create scratch directory"))
    }
}

/// Removes a scratch directory, logging instead of failing.
fn close_scratch(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        tracing::warn!("Failed to remove scratch directory {}: {}", path.display(), e);
    }
}

fn modified_at(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Archive path for a new backup that does not collide with an existing one.
fn unique_archive_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.{}", stem, extension));
    let mut suffix = 1;
    while path.exists() {
        path = dir.join(format!("{}_{}.{}", stem, suffix, extension));
        suffix += 1;
    }
    path
}
