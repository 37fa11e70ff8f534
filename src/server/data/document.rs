//! Document data repository for tenant-scoped records.
//!
//! This module provides the `DocumentRepository`, the storage backend of every business
//! collection. Each record is stored as a JSON body under `(tenant, collection, id)`;
//! every query and deletion is filtered by tenant.

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde_json::Value;

use crate::server::model::snapshot::record_id;

/// Rows per INSERT statement, keeps bound parameters under SQLite's limit.
const INSERT_CHUNK_SIZE: usize = 100;

/// Repository providing database operations for tenant documents.
pub struct DocumentRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> DocumentRepository<'a, C> {
    /// Creates a new DocumentRepository instance.
    ///
    /// # Arguments
    /// - `db` - Database connection or open transaction
    ///
    /// # Returns
    /// - `DocumentRepository` - New repository instance
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Gets every document of a collection owned by a tenant, ordered by id.
    ///
    /// # Arguments
    /// - `tenant` - Owning tenant id
    /// - `collection` - Entity-type name
    ///
    /// # Returns
    /// - `Ok(Vec<Model>)` - All documents, empty when the tenant has none
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_all_by_tenant(
        &self,
        tenant: &str,
        collection: &str,
    ) -> Result<Vec<entity::document::Model>, DbErr> {
        entity::prelude::Document::find()
            .filter(entity::document::Column::Tenant.eq(tenant))
            .filter(entity::document::Column::Collection.eq(collection))
            .order_by_asc(entity::document::Column::Id)
            .all(self.db)
            .await
    }

    /// Finds one document of a tenant by id.
    ///
    /// # Returns
    /// - `Ok(Some(Model))` - Document found
    /// - `Ok(None)` - No such document for this tenant
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_id(
        &self,
        tenant: &str,
        collection: &str,
        id: &str,
    ) -> Result<Option<entity::document::Model>, DbErr> {
        entity::prelude::Document::find_by_id((
            tenant.to_string(),
            collection.to_string(),
            id.to_string(),
        ))
        .one(self.db)
        .await
    }

    /// Creates one document.
    ///
    /// The id is read from the record's `_id` field; the row is always owned by `tenant`
    /// whatever the record's own `tenant` field says.
    ///
    /// # Returns
    /// - `Ok(Model)` - The inserted document
    /// - `Err(DbErr::Custom)` - Record has no string `_id`
    /// - `Err(DbErr)` - Database error during insert, e.g. duplicate id
    pub async fn create(
        &self,
        tenant: &str,
        collection: &str,
        record: Value,
    ) -> Result<entity::document::Model, DbErr> {
        to_active_model(tenant, collection, record)?
            .insert(self.db)
            .await
    }

    /// Creates many documents of one collection.
    ///
    /// Records are inserted in chunks of multi-row INSERT statements. Run inside a
    /// transaction to make the whole batch atomic.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of inserted rows
    /// - `Err(DbErr::Custom)` - A record has no string `_id`; nothing was inserted
    /// - `Err(DbErr)` - Database error during insert
    pub async fn bulk_create(
        &self,
        tenant: &str,
        collection: &str,
        records: &[Value],
    ) -> Result<u64, DbErr> {
        let models = records
            .iter()
            .cloned()
            .map(|record| to_active_model(tenant, collection, record))
            .collect::<Result<Vec<_>, _>>()?;

        let mut inserted = 0;
        for chunk in models.chunks(INSERT_CHUNK_SIZE) {
            inserted += entity::prelude::Document::insert_many(chunk.to_vec())
                .exec_without_returning(self.db)
                .await?;
        }

        Ok(inserted)
    }

    /// Deletes one document of a tenant.
    ///
    /// # Returns
    /// - `Ok(true)` - Document deleted
    /// - `Ok(false)` - No such document for this tenant
    /// - `Err(DbErr)` - Database error during delete
    pub async fn delete_by_id(
        &self,
        tenant: &str,
        collection: &str,
        id: &str,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::Document::delete_many()
            .filter(entity::document::Column::Tenant.eq(tenant))
            .filter(entity::document::Column::Collection.eq(collection))
            .filter(entity::document::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes every document of a collection owned by a tenant.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of deleted rows
    /// - `Err(DbErr)` - Database error during delete
    pub async fn delete_all_by_tenant(&self, tenant: &str, collection: &str) -> Result<u64, DbErr> {
        let result = entity::prelude::Document::delete_many()
            .filter(entity::document::Column::Tenant.eq(tenant))
            .filter(entity::document::Column::Collection.eq(collection))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

fn to_active_model(
    tenant: &str,
    collection: &str,
    record: Value,
) -> Result<entity::document::ActiveModel, DbErr> {
    let id = record_id(&record)
        .ok_or_else(|| {
            DbErr::Custom(format!(
                "Record in '{}' has no string _id: {}",
                collection, record
            ))
        })?
        .to_string();

    Ok(entity::document::ActiveModel {
        tenant: ActiveValue::Set(tenant.to_string()),
        collection: ActiveValue::Set(collection.to_string()),
        id: ActiveValue::Set(id),
        body: ActiveValue::Set(record),
    })
}
