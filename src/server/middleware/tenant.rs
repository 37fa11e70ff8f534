use axum::{extract::FromRequestParts, http::request::Parts};

use crate::server::{error::auth::AuthError, model::tenant::TenantId};

/// Header carrying the authenticated tenant, set by the upstream auth middleware.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Tenant of the authenticated caller.
///
/// Rejects the request with 401 when the header is absent and 400 when it does not hold
/// a valid tenant identifier.
pub struct Tenant(pub TenantId);

impl<S: Send + Sync> FromRequestParts<S> for Tenant {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(TENANT_HEADER) else {
            return Err(AuthError::MissingTenant);
        };

        let value = value.to_str().map_err(|_| {
            AuthError::InvalidTenant(String::from_utf8_lossy(value.as_bytes()).into_owned())
        })?;

        Ok(Self(TenantId::parse(value.trim())?))
    }
}
