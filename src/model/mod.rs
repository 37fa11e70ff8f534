//! API data transfer objects shared by every HTTP endpoint.

pub mod api;
pub mod backup;
pub mod refs;
