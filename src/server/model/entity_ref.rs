//! Reference version domain model.

use chrono::{DateTime, Utc};

use crate::model::refs::RefDto;

/// Version counter of one collection of one tenant.
///
/// `version` is 0 and `last_update` is `None` for a collection that was never bumped.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRef {
    pub tenant: String,
    pub name: String,
    pub version: i64,
    pub last_update: Option<DateTime<Utc>>,
}

impl EntityRef {
    /// Converts an entity model to a domain model at the repository boundary.
    pub fn from_entity(entity: entity::entity_ref::Model) -> Self {
        Self {
            tenant: entity.tenant,
            name: entity.name,
            version: entity.version,
            last_update: Some(entity.last_update),
        }
    }

    /// The implicit ref of a collection that has no stored counter.
    pub fn absent(tenant: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            name: name.into(),
            version: 0,
            last_update: None,
        }
    }

    /// Converts domain model to DTO for API responses.
    pub fn into_dto(self) -> RefDto {
        RefDto {
            name: self.name,
            version: self.version,
            last_update: self.last_update,
        }
    }
}
