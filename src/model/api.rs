use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDto {
    pub error: String,
    /// Stable machine-readable error code, present for backup failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
