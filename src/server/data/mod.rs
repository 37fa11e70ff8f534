//! Database repository layer.
//!
//! Repositories use SeaORM entity models internally and are generic over
//! `ConnectionTrait`, so the same code runs against the connection pool or inside a
//! transaction.

pub mod document;
pub mod entity_ref;

#[cfg(test)]
mod test;
