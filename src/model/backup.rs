use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Response of a finished backup export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BackupCreatedDto {
    /// Public download path of the archive.
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BackupFileDto {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BackupListDto {
    pub backups: Vec<BackupFileDto>,
}

/// Response of a finished restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RestoreResultDto {
    /// Number of restored records per entity type.
    pub restored: BTreeMap<String, u64>,
    /// Number of restored asset files.
    pub assets: usize,
}

/// Multipart body of the restore endpoint, documentation only.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct RestoreUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
