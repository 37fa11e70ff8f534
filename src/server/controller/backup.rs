use axum::{
    extract::{Multipart, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::{
    model::{
        api::ErrorDto,
        backup::{BackupCreatedDto, BackupListDto, RestoreResultDto, RestoreUploadForm},
    },
    server::{
        error::{
            backup::{BackupError, UploadError},
            AppError,
        },
        middleware::tenant::Tenant,
        service::backup::BackupService,
        state::AppState,
    },
};

/// Tag for grouping backup endpoints in OpenAPI documentation
pub static BACKUP_TAG: &str = "backup";

/// Multipart field holding the uploaded archive.
const UPLOAD_FIELD: &str = "file";

/// Create a backup of the caller's tenant.
///
/// Exports every managed collection and the tenant's asset directory into a new archive
/// stored under the tenant's backup directory.
///
/// # Arguments
/// - `state` - Application state containing the database connection and backup settings
/// - `tenant` - Tenant resolved from the upstream authentication header
///
/// # Returns
/// - `201 Created` - Download URL and file name of the new archive
/// - `401 Unauthorized` - No tenant attached to the request
/// - `500 Internal Server Error` - Reading data or writing the archive failed
/// - `504 Gateway Timeout` - A backup step timed out
#[utoipa::path(
    post,
    path = "/api/backup/client/create",
    tag = BACKUP_TAG,
    params(
        ("x-tenant-id" = String, Header, description = "Tenant set by upstream authentication")
    ),
    responses(
        (status = 201, description = "Successfully created backup", body = BackupCreatedDto),
        (status = 401, description = "Request carries no tenant", body = ErrorDto),
        (status = 500, description = "Backup failed", body = ErrorDto),
        (status = 504, description = "Backup step timed out", body = ErrorDto)
    ),
)]
pub async fn create_backup(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
) -> Result<impl IntoResponse, AppError> {
    let backup = BackupService::new(&state.db, &state.backup, &state.locks)
        .export(&tenant)
        .await?;

    Ok((StatusCode::CREATED, Json(backup.into_created_dto())))
}

/// Restore an uploaded backup into the caller's tenant.
///
/// Replaces every managed collection and the asset directory of the tenant with the
/// contents of the uploaded archive. The archive may come from another tenant.
///
/// # Arguments
/// - `state` - Application state containing the database connection and backup settings
/// - `tenant` - Tenant resolved from the upstream authentication header
/// - `multipart` - Multipart body with the archive in the `file` field
///
/// # Returns
/// - `200 OK` - Restored record counts per entity type
/// - `400 Bad Request` - Missing file or unsupported file extension
/// - `401 Unauthorized` - No tenant attached to the request
/// - `422 Unprocessable Entity` - The archive is malformed or incomplete
/// - `500 Internal Server Error` - Replacing data or assets failed
/// - `504 Gateway Timeout` - A restore step timed out
#[utoipa::path(
    post,
    path = "/api/backup/client/restore",
    tag = BACKUP_TAG,
    params(
        ("x-tenant-id" = String, Header, description = "Tenant set by upstream authentication")
    ),
    request_body(content = RestoreUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Successfully restored backup", body = RestoreResultDto),
        (status = 400, description = "Invalid upload", body = ErrorDto),
        (status = 401, description = "Request carries no tenant", body = ErrorDto),
        (status = 422, description = "Invalid backup archive", body = ErrorDto),
        (status = 500, description = "Restore failed", body = ErrorDto),
        (status = 504, description = "Restore step timed out", body = ErrorDto)
    ),
)]
pub async fn restore_backup(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let service = BackupService::new(&state.db, &state.backup, &state.locks);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BackupError::from(UploadError::Multipart(e.to_string())))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let summary = service.import(&tenant, &filename, field).await?;

        return Ok((StatusCode::OK, Json(summary.into_dto())));
    }

    Err(BackupError::from(UploadError::MissingFile).into())
}

/// List the stored backups of the caller's tenant.
///
/// # Returns
/// - `200 OK` - Archives newest first
/// - `401 Unauthorized` - No tenant attached to the request
/// - `500 Internal Server Error` - Reading the backup directory failed
#[utoipa::path(
    get,
    path = "/api/backup/client",
    tag = BACKUP_TAG,
    params(
        ("x-tenant-id" = String, Header, description = "Tenant set by upstream authentication")
    ),
    responses(
        (status = 200, description = "Successfully retrieved backups", body = BackupListDto),
        (status = 401, description = "Request carries no tenant", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_backups(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
) -> Result<impl IntoResponse, AppError> {
    let backups = BackupService::new(&state.db, &state.backup, &state.locks)
        .list_backups(&tenant)
        .await?;

    Ok((
        StatusCode::OK,
        Json(BackupListDto {
            backups: backups.into_iter().map(|backup| backup.into_dto()).collect(),
        }),
    ))
}

/// Download a stored backup of the caller's tenant.
///
/// The tenant in the path must be the caller's own; archives of other tenants, unfinished
/// archives and unknown files are all reported as not found.
///
/// # Arguments
/// - `state` - Application state containing the backup settings
/// - `tenant` - Tenant resolved from the upstream authentication header
/// - `owner` - Tenant segment of the download URL
/// - `filename` - Archive file name
/// - `request` - Original request, forwarded for range and conditional headers
///
/// # Returns
/// - `200 OK` - Archive contents
/// - `401 Unauthorized` - No tenant attached to the request
/// - `404 Not Found` - No such archive for the caller
/// - `500 Internal Server Error` - Reading the archive failed
#[utoipa::path(
    get,
    path = "/backups/{tenant}/{filename}",
    tag = BACKUP_TAG,
    params(
        ("x-tenant-id" = String, Header, description = "Tenant set by upstream authentication"),
        ("tenant" = String, Path, description = "Tenant owning the archive"),
        ("filename" = String, Path, description = "Archive file name")
    ),
    responses(
        (status = 200, description = "Archive contents"),
        (status = 401, description = "Request carries no tenant", body = ErrorDto),
        (status = 404, description = "Backup not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn download_backup(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path((owner, filename)): Path<(String, String)>,
    request: Request,
) -> Result<Response, AppError> {
    let path = BackupService::new(&state.db, &state.backup, &state.locks)
        .backup_path(&tenant, &owner, &filename)
        .await?
        .ok_or_else(|| AppError::NotFound("Backup not found".to_string()))?;

    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    Ok(response.into_response())
}
