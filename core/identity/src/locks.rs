//! Named locks to serialise mutations of individual records.
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OwnedMutexGuard;

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Collection of named, per-record, locks.
///
/// Locks are created on first use and dropped once no task holds or waits on them.
/// Clones share the same set of locks.
#[derive(Clone, Default)]
pub struct RecordLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl RecordLocks {
    /// Wait to acquire exclusive access to an entity record.
    pub async fn entity(&self, id: &str) -> RecordGuard {
        self.acquire(format!("entity/{}", id)).await
    }

    /// Wait to acquire exclusive access to an entity alias.
    pub async fn entity_alias(&self, mount_id: &str, name: &str) -> RecordGuard {
        self.acquire(format!("entity-alias/{}/{}", mount_id, name))
            .await
    }

    /// Wait to acquire exclusive access to a group record.
    pub async fn group(&self, id: &str) -> RecordGuard {
        self.acquire(format!("group/{}", id)).await
    }

    /// Wait to acquire exclusive access to a group alias.
    pub async fn group_alias(&self, mount_id: &str, name: &str) -> RecordGuard {
        self.acquire(format!("group-alias/{}/{}", mount_id, name))
            .await
    }

    /// Wait to acquire exclusive access to a token record.
    pub async fn token(&self, id: &str) -> RecordGuard {
        self.acquire(format!("token/{}", id)).await
    }

    /// Wait to acquire the lock with the given name.
    async fn acquire(&self, key: String) -> RecordGuard {
        let lock = {
            let mut locks = self.access();
            let lock = locks.entry(key.clone()).or_default();
            Arc::clone(lock)
        };
        let guard = lock.lock_owned().await;
        RecordGuard {
            guard: Some(guard),
            key,
            locks: Arc::clone(&self.locks),
        }
    }

    /// Lock and access the shared map of locks.
    fn access(&self) -> MutexGuard<LockMap> {
        self.locks
            .lock()
            .expect("RecordLocks::locks lock poisoned")
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.access().len()
    }
}

/// Exclusive access to a record, released on drop.
pub struct RecordGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        // Release the record before checking for other users of the lock.
        drop(self.guard.take());
        let mut locks = self
            .locks
            .lock()
            .expect("RecordLocks::locks lock poisoned");
        let unused = locks
            .get(&self.key)
            .map(|lock| Arc::strong_count(lock) == 1)
            .unwrap_or(false);
        if unused {
            locks.remove(&self.key);
        }
    }
}
