use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use lru::LruCache;

/// Bounded least-recently-used cache behind a mutex.
///
/// Both [`get`](Self::get) and [`insert`](Self::insert) count as an access, so
/// the entry evicted on overflow is the one nobody has read or written for the
/// longest time. Callers that want to share one cache between several owners
/// wrap it in an `Arc` themselves.
pub struct BlockingLruCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K, V> BlockingLruCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns a clone of the cached value and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        V: Clone,
    {
        self.lock().get(key).cloned()
    }

    /// Inserts or replaces `key`, returning the entry evicted to make room
    /// (if any). Replacing an existing key never evicts another entry.
    pub fn insert(&self, key: K, value: V) -> Option<(K, V)> {
        let mut guard = self.lock();
        if guard.contains(&key) {
            guard.put(key, value);
            return None;
        }
        guard.push(key, value)
    }

    /// Membership test that does not touch recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.lock().contains(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.lock().pop(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.lock().cap()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the LRU list half-updated
    // from our side, so a poisoned mutex is still usable.
    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
