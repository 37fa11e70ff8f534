//! Test fixtures providing reusable test data without database insertion.
//!
//! This module contains fixture functions that create in-memory test data structures
//! for use in unit tests and as default values for factories. Unlike factories,
//! fixtures do NOT insert data into the database.
//!
//! # Example
//!
//! ```rust,ignore
//! use test_utils::fixture;
//!
//! // Create in-memory entity model (no DB)
//! let document = fixture::document::entity();
//!
//! // Create with custom fields
//! let product = fixture::document::entity_builder()
//!     .collection("products")
//!     .field("name", "Burger")
//!     .build();
//! ```

pub mod document;
