//! Per-collection mutual exclusion
//!
//! One exclusive lock per collection name, allocated lazily. The registry's
//! own guard covers only the map lookup/insert; callers hold the returned
//! collection lock for the duration of a Write or Delete.
//!
//! Entries are never evicted, even after the collection is deleted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lock handed out for a single collection
pub type CollectionLock = Arc<Mutex<()>>;

/// Lazily-populated table of one lock per collection name.
///
/// Owned by a single `Driver`; two drivers never share locks.
#[derive(Debug, Default)]
pub struct CollectionLocks {
    table: Mutex<HashMap<String, CollectionLock>>,
}

impl CollectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `collection`, creating it on first use.
    pub fn lock_for(&self, collection: &str) -> CollectionLock {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            table
                .entry(collection.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Number of collections that have ever been locked
    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Acquires a collection lock, blocking indefinitely.
///
/// The guarded value is `()`, so a guard poisoned by a panicking holder
/// carries no broken state and is simply taken over.
pub fn acquire(lock: &CollectionLock) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
