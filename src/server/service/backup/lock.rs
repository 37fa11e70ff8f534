//! Per-tenant mutual exclusion for backup operations.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard},
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::server::model::tenant::TenantId;

type LockMap = HashMap<TenantId, Arc<Mutex<()>>>;

/// Hands out one lock per tenant.
///
/// An export or import holds its tenant's lock for its whole duration, so two restores of
/// the same tenant, or a restore and an export, never interleave. Different tenants never
/// wait on each other. Clones share the same set of locks.
///
/// A tenant's entry lives only while someone holds or waits for its lock; the last
/// guard to be released removes it.
#[derive(Clone, Default)]
pub struct TenantLocks {
    locks: Arc<StdMutex<LockMap>>,
}

/// Holds a tenant's lock until dropped.
pub struct TenantLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    tenant: TenantId,
    locks: Arc<StdMutex<LockMap>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and takes the lock of a tenant.
    ///
    /// # Returns
    /// - `TenantLockGuard` - The lock is released when the guard is dropped
    pub async fn acquire(&self, tenant: &TenantId) -> TenantLockGuard {
        // The map is only touched in short synchronous sections, never across an await.
        let lock = lock_map(&self.locks)
            .entry(tenant.clone())
            .or_default()
            .clone();

        TenantLockGuard {
            guard: Some(lock.lock_owned().await),
            tenant: tenant.clone(),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl Drop for TenantLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = lock_map(&self.locks);
        let unused = locks
            .get(&self.tenant)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            locks.remove(&self.tenant);
        }
    }
}

fn lock_map(locks: &StdMutex<LockMap>) -> StdMutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
