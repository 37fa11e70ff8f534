//! Back-office Test Utils
//!
//! Provides shared testing utilities for building integration and unit tests for the back-office
//! application. This crate offers a builder pattern for creating test contexts with in-memory
//! SQLite databases, customizable table schemas, and throwaway filesystem roots for assets,
//! backups, and scratch space.
//!
//! # Overview
//!
//! The test utilities consist of these main components:
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment containing database connection and filesystem roots
//! - **TestError**: Error types that can occur during test setup
//! - **factory** / **fixture**: Test data with and without database insertion
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn test_backup_operations() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_backup_tables()
//!         .with_filesystem()
//!         .build()
//!         .await?;
//!
//!     let db = test.db.as_ref().unwrap();
//!     let fs = test.fs.as_ref().unwrap();
//!     // Perform operations...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod fixture;
pub mod fs;
