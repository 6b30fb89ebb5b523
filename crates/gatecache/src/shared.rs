//! Cache handle shareable across threads

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::Cache;
use crate::stats::CacheStats;
use crate::strategy::CacheStrategy;

/// Clonable handle serializing every operation on one [`Cache`]
///
/// Every operation takes the lock for its whole duration, including the
/// read-modify-write a strategy does on lookup.
pub struct SharedCache<S> {
    inner: Arc<Mutex<Cache<S>>>,
}

impl<S> Clone for SharedCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CacheStrategy> SharedCache<S> {
    /// Share `cache`
    pub fn new(cache: Cache<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Fetch the value for `key`
    pub fn get(&self, key: &S::Key) -> Option<S::Value> {
        self.inner.lock().get(key)
    }

    /// Store `value` under `key`
    pub fn set(&self, key: S::Key, value: S::Value) {
        self.inner.lock().set(key, value);
    }

    /// Remove `key`
    pub fn erase(&self, key: &S::Key) -> bool {
        self.inner.lock().erase(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Strategy counters
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Run `f` with exclusive access to the cache
    pub fn with<R>(&self, f: impl FnOnce(&mut Cache<S>) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}

impl<S: CacheStrategy> From<Cache<S>> for SharedCache<S> {
    fn from(cache: Cache<S>) -> Self {
        Self::new(cache)
    }
}
