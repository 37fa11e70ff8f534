//! Entity ref factory for creating test version counters.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating version counters with a chosen starting version.
pub struct EntityRefFactory<'a> {
    db: &'a DatabaseConnection,
    tenant: String,
    name: String,
    version: i64,
}

impl<'a> EntityRefFactory<'a> {
    /// Creates a new EntityRefFactory at version 1.
    pub fn new(
        db: &'a DatabaseConnection,
        tenant: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            db,
            tenant: tenant.into(),
            name: name.into(),
            version: 1,
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Builds and inserts the ref into the database.
    ///
    /// # Returns
    /// - `Ok(entity::entity_ref::Model)` - Created ref
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::entity_ref::Model, DbErr> {
        entity::entity_ref::ActiveModel {
            tenant: ActiveValue::Set(self.tenant),
            name: ActiveValue::Set(self.name),
            version: ActiveValue::Set(self.version),
            last_update: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a ref at version 1.
pub async fn create_entity_ref(
    db: &DatabaseConnection,
    tenant: &str,
    name: &str,
) -> Result<entity::entity_ref::Model, DbErr> {
    EntityRefFactory::new(db, tenant, name).build().await
}
