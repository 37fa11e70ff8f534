//! Blocking filesystem and text helpers used by the backup engine.
//!
//! - `archive` - zip container codec with traversal-safe extraction
//! - `relocate` - moves an extracted asset tree into the live asset directory
//! - `rewrite` - rewrites tenant identifiers inside a restored snapshot

pub mod archive;
pub mod relocate;
pub mod rewrite;
