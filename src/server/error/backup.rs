//! Backup and restore error taxonomy.
//!
//! Every failure of the exporter or importer surfaces as one `BackupError` variant naming
//! the step that failed. Each variant carries a stable code returned to HTTP clients.
//!
//! Restore is not fully atomic. The dataset replace runs in one database transaction and
//! rolls back on failure, but ref bumps and asset relocation run after the commit: an
//! `AssetCopy` error leaves the new records and bumped refs in place with the previous
//! asset tree.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use std::{fmt, path::PathBuf};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Reading one collection for export failed; the export was aborted.
    #[error("Failed to read {entity_type} for backup: {source}")]
    DbRead {
        entity_type: String,
        #[source]
        source: DbErr,
    },

    /// Deleting or inserting one collection during restore failed.
    #[error("Failed to {phase} {entity_type} during restore: {source}")]
    DbReplace {
        entity_type: String,
        phase: ReplacePhase,
        #[source]
        source: DbErr,
    },

    /// Bumping ref versions after a committed restore failed.
    #[error("Failed to update refs after restore: {0}")]
    RefUpdate(#[source] DbErr),

    #[error(transparent)]
    AssetCopy(#[from] AssetCopyError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Filesystem failure outside archive and asset handling.
    #[error("Backup step '{step}' failed: {source}")]
    Io {
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Backup step '{step}' timed out after {seconds}s")]
    Timeout { step: &'static str, seconds: u64 },
}

impl BackupError {
    /// Wraps an IO error with the step it happened in.
    pub fn io(step: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Io { step, source }
    }

    /// Stable machine-readable code of the error family.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Upload(_) => "BACKUP_UPLOAD",
            Self::Extraction(_) => "BACKUP_EXTRACTION",
            Self::DbRead { .. } => "BACKUP_DB_READ",
            Self::DbReplace { .. } => "BACKUP_DB_REPLACE",
            Self::RefUpdate(_) => "BACKUP_REF_UPDATE",
            Self::AssetCopy(_) => "BACKUP_ASSET_COPY",
            Self::Archive(_) => "BACKUP_ARCHIVE",
            Self::Io { .. } => "BACKUP_IO",
            Self::Timeout { .. } => "BACKUP_TIMEOUT",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Phase of the dataset replace in which a database error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacePhase {
    Begin,
    Delete,
    Create,
    Commit,
}

impl fmt::Display for ReplacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Self::Begin => "begin transaction for",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Commit => "commit",
        };
        f.write_str(phase)
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    /// File extension is not in the configured allow-list.
    #[error("Unsupported backup file '{filename}', expected one of: {allowed}")]
    UnsupportedExtension { filename: String, allowed: String },

    /// The multipart body could not be read.
    #[error("Failed to read upload: {0}")]
    Multipart(String),

    /// The multipart body contains no file field.
    #[error("No backup file was uploaded")]
    MissingFile,
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The container is not a readable zip archive.
    #[error("Backup archive is malformed: {0}")]
    Malformed(#[from] zip::result::ZipError),

    /// An entry would be written outside the extraction directory.
    #[error("Backup archive entry '{0}' escapes the extraction directory")]
    UnsafePath(String),

    /// A required archive member is absent.
    #[error("Backup archive has no '{0}' member")]
    MissingMember(&'static str),

    /// The `db` member does not parse as a snapshot.
    #[error("Backup database dump is invalid: {0}")]
    InvalidSnapshot(String),

    #[error("Failed to extract backup archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk directory for archive: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Archive task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum AssetCopyError {
    /// One or more asset files could not be copied; the live directory was left untouched.
    #[error("Failed to copy {} asset file(s), first: {}", .0.len(), first_failure(.0))]
    Files(Vec<(PathBuf, std::io::Error)>),

    /// Preparing or swapping the asset directory failed.
    #[error("Failed to relocate asset directory {path}: {source}")]
    Relocate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Asset copy task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn first_failure(failures: &[(PathBuf, std::io::Error)]) -> String {
    failures
        .first()
        .map(|(path, err)| format!("{}: {}", path.display(), err))
        .unwrap_or_default()
}

/// Converts backup errors into HTTP responses.
///
/// Client-side problems (bad upload, broken archive) return their message. Server-side
/// failures are logged in full and return a generic message. Every response carries the
/// error family code.
impl IntoResponse for BackupError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = Some(self.code().to_string());

        let error = if status.is_server_error() {
            tracing::error!("Backup failure: {}", self);
            match self {
                Self::Timeout { .. } => self.to_string(),
                _ => "Backup operation failed".to_string(),
            }
        } else {
            tracing::debug!("Rejected backup request: {}", self);
            self.to_string()
        };

        (status, Json(ErrorDto { error, code })).into_response()
    }
}
