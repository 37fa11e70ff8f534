//! HTTP request handlers.
//!
//! Controllers resolve the caller's tenant, call the matching service, and convert the
//! returned domain models into DTOs.

pub mod backup;
pub mod refs;
