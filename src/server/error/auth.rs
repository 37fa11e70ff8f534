use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The upstream authentication middleware did not attach a tenant to the request.
    ///
    /// Results in a 401 Unauthorized response.
    #[error("Request carries no tenant header")]
    MissingTenant,

    /// The tenant header is present but is not a valid tenant identifier.
    ///
    /// Results in a 400 Bad Request response.
    #[error("Invalid tenant identifier '{0}'")]
    InvalidTenant(String),
}

/// Converts authentication errors into HTTP responses.
///
/// # Returns
/// - 401 Unauthorized - No tenant attached by upstream authentication
/// - 400 Bad Request - Tenant identifier is malformed
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingTenant => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorDto {
                    error: "Authentication required".to_string(),
                    code: None,
                }),
            )
                .into_response(),
            Self::InvalidTenant(_) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorDto {
                    error: self.to_string(),
                    code: None,
                }),
            )
                .into_response(),
        }
    }
}
