use axum::{extract::FromRequestParts, http::Request};

use crate::server::{
    error::auth::AuthError,
    middleware::tenant::{Tenant, TENANT_HEADER},
};

mod tenant;
