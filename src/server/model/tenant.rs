//! Tenant identifier.

use std::fmt;

use crate::server::error::auth::AuthError;

/// Longest accepted tenant identifier.
const MAX_TENANT_LEN: usize = 128;

/// Validated tenant identifier.
///
/// Tenant ids become directory names under the asset and backup roots, so only ASCII
/// letters, digits, `-` and `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantId(String);

impl TenantId {
    /// Parses a tenant identifier.
    ///
    /// # Returns
    /// - `Ok(TenantId)` - Identifier is non-empty, at most 128 characters, and path-safe
    /// - `Err(AuthError::InvalidTenant)` - Identifier is empty, too long, or contains
    ///   characters outside `[A-Za-z0-9_-]`
    pub fn parse(value: impl Into<String>) -> Result<Self, AuthError> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= MAX_TENANT_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(value))
        } else {
            Err(AuthError::InvalidTenant(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
