//! Reference version repository.
//!
//! This module provides the `EntityRefRepository` for the per-tenant, per-collection
//! version counters consumers poll to detect stale caches.

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ExprTrait, QueryFilter,
    QueryOrder,
};

use crate::server::model::entity_ref::EntityRef;

/// Repository providing database operations for version counters.
pub struct EntityRefRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> EntityRefRepository<'a, C> {
    /// Creates a new EntityRefRepository instance.
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Gets the counter of one collection.
    ///
    /// Never creates a row: a collection without a stored counter yields the implicit
    /// version 0.
    ///
    /// # Returns
    /// - `Ok(EntityRef)` - Stored counter, or version 0 when absent
    /// - `Err(DbErr)` - Database error during query
    pub async fn get(&self, tenant: &str, name: &str) -> Result<EntityRef, DbErr> {
        let entity = entity::prelude::EntityRef::find_by_id((tenant.to_string(), name.to_string()))
            .one(self.db)
            .await?;

        Ok(entity
            .map(EntityRef::from_entity)
            .unwrap_or_else(|| EntityRef::absent(tenant, name)))
    }

    /// Gets every stored counter of a tenant ordered by name.
    pub async fn list(&self, tenant: &str) -> Result<Vec<EntityRef>, DbErr> {
        let entities = entity::prelude::EntityRef::find()
            .filter(entity::entity_ref::Column::Tenant.eq(tenant))
            .order_by_asc(entity::entity_ref::Column::Name)
            .all(self.db)
            .await?;

        Ok(entities.into_iter().map(EntityRef::from_entity).collect())
    }

    /// Increments the counter of one collection.
    ///
    /// Performs a single upsert: the row is created at version 1 when absent, otherwise
    /// its version is incremented in the database and `last_update` set to now. The
    /// increment never reads the old value into the application, so concurrent callers
    /// cannot lose updates.
    ///
    /// # Returns
    /// - `Ok(EntityRef)` - The counter after the increment
    /// - `Err(DbErr)` - Database error during upsert
    pub async fn rise(&self, tenant: &str, name: &str) -> Result<EntityRef, DbErr> {
        let entity = entity::prelude::EntityRef::insert(entity::entity_ref::ActiveModel {
            tenant: ActiveValue::Set(tenant.to_string()),
            name: ActiveValue::Set(name.to_string()),
            version: ActiveValue::Set(1),
            last_update: ActiveValue::Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                entity::entity_ref::Column::Tenant,
                entity::entity_ref::Column::Name,
            ])
            .value(
                entity::entity_ref::Column::Version,
                Expr::col(entity::entity_ref::Column::Version).add(1),
            )
            .update_column(entity::entity_ref::Column::LastUpdate)
            .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        Ok(EntityRef::from_entity(entity))
    }
}
