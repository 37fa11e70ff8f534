//! Application state shared across all request handlers.
//!
//! The state is initialized once during startup and cloned for each request through
//! Axum's state extraction. It holds the database connection pool, the backup engine
//! settings, and the per-tenant backup locks.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::server::{model::backup::BackupSettings, service::backup::lock::TenantLocks};

/// Application state containing shared resources and dependencies.
///
/// All fields are cheap to clone:
/// - `DatabaseConnection` is a connection pool (clones share the pool)
/// - `Arc<BackupSettings>` is a reference-counted pointer
/// - `TenantLocks` shares its lock table between clones
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing persistent storage.
    pub db: DatabaseConnection,

    /// Filesystem layout and behaviour of backup export and restore.
    pub backup: Arc<BackupSettings>,

    /// Locks serializing backup operations of the same tenant.
    ///
    /// Must be shared by every request so that two restores of one tenant never overlap.
    pub locks: TenantLocks,
}

impl AppState {
    /// Creates a new application state with the provided dependencies.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `backup` - Backup engine settings
    ///
    /// # Returns
    /// - `AppState` - Initialized application state with an empty lock table
    pub fn new(db: DatabaseConnection, backup: BackupSettings) -> Self {
        Self {
            db,
            backup: Arc::new(backup),
            locks: TenantLocks::new(),
        }
    }
}
