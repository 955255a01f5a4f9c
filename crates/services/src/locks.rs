//! Keyed async locks scoping serialization to a single aggregate: one
//! thread, or one (account, response) pair.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One mutex per key, created on first use. Entries are a pointer each and
/// bounded by the number of live aggregates, so they are never reclaimed.
pub(crate) struct KeyedLocks<K> {
    inner: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash> KeyedLocks<K> {
    pub(crate) fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub(crate) async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        // The map shard guard must drop before awaiting the mutex.
        let lock = self
            .inner
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        lock.lock_owned().await
    }
}
