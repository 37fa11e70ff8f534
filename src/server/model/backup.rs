//! Backup domain models and settings.

use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crate::{
    model::backup::{BackupCreatedDto, BackupFileDto, RestoreResultDto},
    server::model::tenant::TenantId,
};

/// Archive member holding the snapshot JSON.
pub const DB_MEMBER: &str = "db";

/// Archive member holding the nested asset archive.
pub const DATA_MEMBER: &str = "data";

/// How tenant identifiers inside a restored snapshot are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteMode {
    /// Global textual replacement of the old tenant id in the raw JSON.
    ///
    /// Any unrelated value containing the old id as a substring is rewritten as well.
    #[default]
    Text,
    /// Rewrite only `tenant` fields and asset path segments after parsing.
    Structural,
}

impl FromStr for RewriteMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "structural" => Ok(Self::Structural),
            other => Err(other.to_string()),
        }
    }
}

/// Filesystem layout and behaviour of the backup engine.
#[derive(Debug, Clone)]
pub struct BackupSettings {
    /// Root of live tenant assets, `<assets_dir>/<tenant>/...`.
    pub assets_dir: PathBuf,
    /// Root of backup archives, `<backups_dir>/<tenant>/...`.
    pub backups_dir: PathBuf,
    /// Parent of staging and import scratch directories.
    pub scratch_dir: PathBuf,
    /// Accepted archive extensions without the dot, lowercase. The first one is used
    /// for new archives.
    pub extensions: Vec<String>,
    pub rewrite_mode: RewriteMode,
    /// Upper bound of every export/import step.
    pub step_timeout: Duration,
    /// Largest accepted restore upload.
    pub max_upload_bytes: usize,
}

impl BackupSettings {
    pub fn tenant_assets(&self, tenant: &TenantId) -> PathBuf {
        self.assets_dir.join(tenant.as_str())
    }

    pub fn tenant_backups(&self, tenant: &TenantId) -> PathBuf {
        self.backups_dir.join(tenant.as_str())
    }

    /// Extension of newly created archives.
    pub fn archive_extension(&self) -> &str {
        self.extensions.first().map(String::as_str).unwrap_or("tdb")
    }

    /// Whether a file name carries one of the accepted archive extensions.
    pub fn accepts(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

/// A backup archive stored for a tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupFile {
    pub filename: String,
    /// Public download path.
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

impl BackupFile {
    pub fn public_url(tenant: &TenantId, filename: &str) -> String {
        format!("/backups/{}/{}", tenant, filename)
    }

    pub fn into_created_dto(self) -> BackupCreatedDto {
        BackupCreatedDto {
            url: self.url,
            filename: self.filename,
        }
    }

    pub fn into_dto(self) -> BackupFileDto {
        BackupFileDto {
            url: self.url,
            filename: self.filename,
            size: self.size,
            created_at: self.created_at,
        }
    }
}

/// Outcome of a finished restore.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestoreSummary {
    /// Inserted records per entity type.
    pub restored: BTreeMap<String, u64>,
    /// Asset files now live for the tenant.
    pub assets: usize,
}

impl RestoreSummary {
    pub fn into_dto(self) -> RestoreResultDto {
        RestoreResultDto {
            restored: self.restored,
            assets: self.assets,
        }
    }
}
