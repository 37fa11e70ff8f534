//! Tenant dataset snapshot.
//!
//! A snapshot holds every record of one tenant, partitioned by entity type. Records are
//! plain JSON objects; only the `_id` identifier and the `tenant` owner field carry meaning
//! at this layer.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::server::error::backup::ExtractionError;

/// Every entity type managed by backups, in restore order.
pub const ENTITY_TYPES: [&str; 16] = [
    "ads",
    "themes",
    "assets",
    "businessPeriods",
    "checks",
    "currencies",
    "employees",
    "languages",
    "nodes",
    "orderTypes",
    "products",
    "selectors",
    "stores",
    "tags",
    "translations",
    "systemTags",
];

/// Record identifier field.
pub const ID_FIELD: &str = "_id";

/// Record owner field.
pub const TENANT_FIELD: &str = "tenant";

/// Storage bookkeeping fields that never leave the database.
const INTERNAL_FIELDS: [&str; 1] = ["__v"];

/// Returns the identifier of a record, if it has a string `_id`.
pub fn record_id(record: &Value) -> Option<&str> {
    record.get(ID_FIELD).and_then(Value::as_str)
}

/// Full dataset of one tenant keyed by entity type.
///
/// Every managed entity type is always present, possibly with no records.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    collections: BTreeMap<String, Vec<Value>>,
}

impl Snapshot {
    /// Creates a snapshot with every managed entity type and no records.
    pub fn new() -> Self {
        Self {
            collections: ENTITY_TYPES
                .iter()
                .map(|entity_type| (entity_type.to_string(), Vec::new()))
                .collect(),
        }
    }

    /// Builds the exported form of a stored document.
    ///
    /// The identifier is taken from the row so it is always a string, and storage
    /// bookkeeping fields are dropped.
    pub fn export_record(model: entity::document::Model) -> Value {
        let mut record = match model.body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for field in INTERNAL_FIELDS {
            record.remove(field);
        }
        record.insert(ID_FIELD.to_string(), Value::String(model.id));

        Value::Object(record)
    }

    /// Replaces the records of one entity type.
    pub fn insert(&mut self, entity_type: impl Into<String>, records: Vec<Value>) {
        self.collections.insert(entity_type.into(), records);
    }

    /// Records of one entity type, empty for unknown types.
    pub fn records(&self, entity_type: &str) -> &[Value] {
        self.collections
            .get(entity_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.collections
            .iter()
            .map(|(entity_type, records)| (entity_type.as_str(), records.as_slice()))
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.collections.values_mut().flat_map(|records| records.iter_mut())
    }

    /// Total number of records across every entity type.
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes the snapshot as the `db` member of a backup archive.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.collections)
    }

    /// Parses the `db` member of a backup archive.
    ///
    /// Unknown entity types are skipped with a warning and missing ones are treated as
    /// empty, so archives from older or newer releases remain restorable.
    ///
    /// # Returns
    /// - `Ok(Snapshot)` - Every managed entity type is an array of objects with string `_id`
    /// - `Err(ExtractionError::InvalidSnapshot)` - Text is not JSON, not an object, or a
    ///   record is malformed
    pub fn from_json_str(text: &str) -> Result<Self, ExtractionError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| ExtractionError::InvalidSnapshot(e.to_string()))?;

        let Value::Object(root) = root else {
            return Err(ExtractionError::InvalidSnapshot(
                "expected a JSON object keyed by entity type".to_string(),
            ));
        };

        let mut snapshot = Self::new();

        for (entity_type, records) in root {
            if !ENTITY_TYPES.contains(&entity_type.as_str()) {
                tracing::warn!("Ignoring unknown entity type '{}' in backup", entity_type);
                continue;
            }

            let Value::Array(records) = records else {
                return Err(ExtractionError::InvalidSnapshot(format!(
                    "'{}' is not an array",
                    entity_type
                )));
            };

            for (index, record) in records.iter().enumerate() {
                if !record.is_object() || record_id(record).is_none() {
                    return Err(ExtractionError::InvalidSnapshot(format!(
                        "record {} of '{}' has no string {}",
                        index, entity_type, ID_FIELD
                    )));
                }
            }

            snapshot.insert(entity_type, records);
        }

        Ok(snapshot)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}
