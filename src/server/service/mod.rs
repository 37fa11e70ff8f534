//! Service layer for business logic and orchestration.
//!
//! Services sit between the controllers and the repositories. They work with domain
//! models, coordinate repository calls and filesystem work, and own transaction
//! boundaries.
//!
//! - `backup` - Client backup export, restore, listing, and retention
//! - `refs` - Per-tenant collection version counters

pub mod backup;
pub mod refs;
