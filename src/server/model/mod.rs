//! Server-side domain models and parameter types.
//!
//! Domain models are converted from entity models at the repository boundary and
//! transformed to DTOs at the controller boundary.

pub mod backup;
pub mod entity_ref;
pub mod snapshot;
pub mod tenant;
