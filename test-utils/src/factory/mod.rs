//! Factory methods for creating test data.
//!
//! This module provides factory methods for creating test entities with sensible defaults,
//! reducing boilerplate in tests.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), sea_orm::DbErr> {
//!     let db = /* ... */;
//!
//!     // Create with defaults
//!     let document = factory::create_document(&db, "tenant-a", "products").await?;
//!
//!     // Customize
//!     let ad = factory::document::DocumentFactory::new(&db, "tenant-a", "ads")
//!         .id("ad-1")
//!         .field("image", "assets/tenant-a/ads/banner.png")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Available Factories
//!
//! - `document` - Create tenant documents in any collection
//! - `entity_ref` - Create version counters
//! - `helpers` - Convenience methods for seeding whole tenant datasets

pub mod document;
pub mod entity_ref;
pub mod helpers;

// Re-export commonly used factory functions for concise usage
pub use document::create_document;
pub use entity_ref::create_entity_ref;
pub use helpers::seed_tenant;
