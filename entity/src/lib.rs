//! SeaORM entities for the back-office database.

pub mod prelude;

pub mod document;
pub mod entity_ref;
