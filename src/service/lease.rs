//! Per-artifact mutual exclusion.
//!
//! Mutating operations on one artifact hold an exclusive lease from
//! validation to the final metadata commit, so the stored blob and the
//! recorded fingerprint always come from the same write. Reads hold a shared
//! lease across the record load and blob read, so they never observe a blob
//! from one write paired with the record of another. Different artifacts
//! never contend.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use uuid::Uuid;

type LockMap = DashMap<Uuid, Arc<RwLock<()>>>;

/// Registry of per-artifact locks.
#[derive(Debug, Default, Clone)]
pub struct ArtifactLocks {
    locks: Arc<LockMap>,
}

impl ArtifactLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, id: Uuid) -> Arc<RwLock<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Wait for exclusive access to `id`.
    pub async fn acquire(&self, id: Uuid) -> ArtifactLease {
        let guard = self.lock_for(id).write_owned().await;
        self.lease(id, LeaseGuard::Exclusive(guard))
    }

    /// Wait for shared access to `id`. Shared leases exclude writers only.
    pub async fn acquire_shared(&self, id: Uuid) -> ArtifactLease {
        let guard = self.lock_for(id).read_owned().await;
        self.lease(id, LeaseGuard::Shared(guard))
    }

    fn lease(&self, id: Uuid, guard: LeaseGuard) -> ArtifactLease {
        ArtifactLease {
            id,
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// Number of artifacts with a held or awaited lease.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

#[derive(Debug)]
enum LeaseGuard {
    Exclusive(OwnedRwLockWriteGuard<()>),
    Shared(OwnedRwLockReadGuard<()>),
}

/// Access to one artifact, released on drop.
#[derive(Debug)]
pub struct ArtifactLease {
    id: Uuid,
    guard: Option<LeaseGuard>,
    locks: Arc<LockMap>,
}

impl ArtifactLease {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self.guard, Some(LeaseGuard::Exclusive(_)))
    }
}

impl Drop for ArtifactLease {
    fn drop(&mut self) {
        // Release first so the strong count reflects only the map and waiters.
        self.guard.take();
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
