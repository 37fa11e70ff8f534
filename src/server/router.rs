use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    model::{
        api::ErrorDto,
        backup::{BackupCreatedDto, BackupFileDto, BackupListDto, RestoreResultDto, RestoreUploadForm},
        refs::{RefDto, RefListDto},
    },
    server::{
        controller::{
            backup::{create_backup, download_backup, get_backups, restore_backup, BACKUP_TAG},
            refs::{get_ref, get_refs, REFS_TAG},
        },
        state::AppState,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::server::controller::backup::create_backup,
        crate::server::controller::backup::restore_backup,
        crate::server::controller::backup::get_backups,
        crate::server::controller::backup::download_backup,
        crate::server::controller::refs::get_refs,
        crate::server::controller::refs::get_ref,
    ),
    components(
        schemas(
            ErrorDto,
            BackupCreatedDto,
            BackupFileDto,
            BackupListDto,
            RestoreResultDto,
            RestoreUploadForm,
            RefDto,
            RefListDto,
        )
    ),
    tags(
        (name = BACKUP_TAG, description = "Client backup export and restore"),
        (name = REFS_TAG, description = "Per-collection version counters")
    )
)]
pub struct ApiDoc;

/// Builds the application router.
///
/// Backup archives are downloaded from `/backups/{tenant}/{filename}` by their own tenant
/// only. The restore route accepts bodies up to the configured upload limit; the body is
/// streamed to disk.
pub fn router(state: AppState) -> Router {
    let max_upload = state.backup.max_upload_bytes;

    Router::new()
        .route("/api/backup/client", get(get_backups))
        .route("/api/backup/client/create", post(create_backup))
        .route(
            "/api/backup/client/restore",
            post(restore_backup).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/api/refs", get(get_refs))
        .route("/api/refs/{name}", get(get_ref))
        .route("/backups/{tenant}/{filename}", get(download_backup))
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
