use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        refs::{RefDto, RefListDto},
    },
    server::{
        error::AppError, middleware::tenant::Tenant, service::refs::RefService, state::AppState,
    },
};

/// Tag for grouping ref endpoints in OpenAPI documentation
pub static REFS_TAG: &str = "refs";

/// Get every collection version of the caller's tenant.
///
/// Collections that never changed are absent; clients treat them as version 0.
///
/// # Returns
/// - `200 OK` - Stored versions ordered by collection name
/// - `401 Unauthorized` - No tenant attached to the request
/// - `500 Internal Server Error` - Database error
#[utoipa::path(
    get,
    path = "/api/refs",
    tag = REFS_TAG,
    params(
        ("x-tenant-id" = String, Header, description = "Tenant set by upstream authentication")
    ),
    responses(
        (status = 200, description = "Successfully retrieved refs", body = RefListDto),
        (status = 401, description = "Request carries no tenant", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_refs(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
) -> Result<impl IntoResponse, AppError> {
    let refs = RefService::new(&state.db).list(&tenant).await?;

    Ok((
        StatusCode::OK,
        Json(RefListDto {
            refs: refs.into_iter().map(|entity_ref| entity_ref.into_dto()).collect(),
        }),
    ))
}

/// Get the version of one collection of the caller's tenant.
///
/// # Returns
/// - `200 OK` - Current version, 0 with no `lastUpdate` when the collection never changed
/// - `401 Unauthorized` - No tenant attached to the request
/// - `500 Internal Server Error` - Database error
#[utoipa::path(
    get,
    path = "/api/refs/{name}",
    tag = REFS_TAG,
    params(
        ("x-tenant-id" = String, Header, description = "Tenant set by upstream authentication"),
        ("name" = String, Path, description = "Collection name, e.g. products")
    ),
    responses(
        (status = 200, description = "Successfully retrieved ref", body = RefDto),
        (status = 401, description = "Request carries no tenant", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_ref(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entity_ref = RefService::new(&state.db).get(&tenant, &name).await?;

    Ok((StatusCode::OK, Json(entity_ref.into_dto())))
}
