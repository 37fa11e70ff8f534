//! Document factory for creating test tenant documents.

use crate::{factory::helpers::next_id, fixture};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};
use serde_json::Value;

/// Factory for creating test documents with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::document::DocumentFactory;
///
/// let product = DocumentFactory::new(&db, "tenant-a", "products")
///     .id("p-1")
///     .field("price", 450)
///     .build()
///     .await?;
/// ```
pub struct DocumentFactory<'a> {
    db: &'a DatabaseConnection,
    builder: fixture::document::DocumentEntityBuilder,
}

impl<'a> DocumentFactory<'a> {
    /// Creates a new DocumentFactory with default values.
    ///
    /// Defaults:
    /// - id: `"{collection}-{n}"` where n is auto-incremented
    /// - body: `{ "_id", "tenant", "name" }`
    pub fn new(
        db: &'a DatabaseConnection,
        tenant: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        let collection = collection.into();
        let builder = fixture::document::entity_builder()
            .tenant(tenant)
            .id(format!("{}-{}", collection, next_id()))
            .collection(collection);

        Self { db, builder }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.builder = self.builder.id(id);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.builder = self.builder.field(key, value);
        self
    }

    /// Builds and inserts the document into the database.
    ///
    /// # Returns
    /// - `Ok(entity::document::Model)` - Created document
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::document::Model, DbErr> {
        let model = self.builder.build();
        entity::document::ActiveModel {
            tenant: ActiveValue::Set(model.tenant),
            collection: ActiveValue::Set(model.collection),
            id: ActiveValue::Set(model.id),
            body: ActiveValue::Set(model.body),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a document with default values.
///
/// Shorthand for `DocumentFactory::new(db, tenant, collection).build().await`.
pub async fn create_document(
    db: &DatabaseConnection,
    tenant: &str,
    collection: &str,
) -> Result<entity::document::Model, DbErr> {
    DocumentFactory::new(db, tenant, collection).build().await
}
