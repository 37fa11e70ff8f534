//! Document fixtures for creating in-memory test data.
//!
//! Provides fixture functions for creating document entity models and raw JSON records
//! without database insertion.

use entity::document;
use serde_json::{json, Map, Value};

/// Default test tenant id.
pub const DEFAULT_TENANT: &str = "tenant-a";

/// Default test collection.
pub const DEFAULT_COLLECTION: &str = "products";

/// Default test document id.
pub const DEFAULT_ID: &str = "doc-1";

/// Creates a JSON record shaped the way the back office stores it.
///
/// # Arguments
/// - `tenant` - Owning tenant, written to the `tenant` field
/// - `id` - Record identifier, written to the `_id` field
///
/// # Returns
/// - `Value` - JSON object with `_id`, `tenant`, and a `name` field
pub fn record(tenant: &str, id: &str) -> Value {
    json!({
        "_id": id,
        "tenant": tenant,
        "name": format!("Record {}", id),
    })
}

/// Creates a document entity model with default values.
///
/// # Default Values
/// - tenant: `"tenant-a"`
/// - collection: `"products"`
/// - id: `"doc-1"`
/// - body: `record("tenant-a", "doc-1")`
pub fn entity() -> document::Model {
    entity_builder().build()
}

/// Creates a document entity builder for customization.
pub fn entity_builder() -> DocumentEntityBuilder {
    DocumentEntityBuilder {
        tenant: DEFAULT_TENANT.to_string(),
        collection: DEFAULT_COLLECTION.to_string(),
        id: DEFAULT_ID.to_string(),
        extra: Map::new(),
    }
}

/// Builder for in-memory document models.
///
/// The `_id` and `tenant` fields of the body always mirror the builder's `id` and
/// `tenant`, matching how the repository stores records.
pub struct DocumentEntityBuilder {
    tenant: String,
    collection: String,
    id: String,
    extra: Map<String, Value>,
}

impl DocumentEntityBuilder {
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Adds an arbitrary body field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> document::Model {
        let mut body = record(&self.tenant, &self.id);
        if let Value::Object(ref mut map) = body {
            map.extend(self.extra);
        }

        document::Model {
            tenant: self.tenant,
            collection: self.collection,
            id: self.id,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_default_document() {
        let document = entity();

        assert_eq!(document.tenant, DEFAULT_TENANT);
        assert_eq!(document.collection, DEFAULT_COLLECTION);
        assert_eq!(document.body["_id"], DEFAULT_ID);
        assert_eq!(document.body["tenant"], DEFAULT_TENANT);
    }

    #[test]
    fn body_mirrors_custom_id_and_tenant() {
        let document = entity_builder()
            .tenant("tenant-z")
            .id("abc")
            .field("price", 12)
            .build();

        assert_eq!(document.body["_id"], "abc");
        assert_eq!(document.body["tenant"], "tenant-z");
        assert_eq!(document.body["price"], 12);
    }
}
