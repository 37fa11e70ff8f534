pub use super::document::Entity as Document;
pub use super::entity_ref::Entity as EntityRef;
