//! Write-through lookup handle

use std::ops::{Deref, DerefMut};

use crate::cache::Cache;
use crate::strategy::CacheStrategy;

/// Result of [`Cache::lookup`], bound to its cache and key
///
/// Behaves like an `Option` of the value (it derefs to one). Assigning
/// through [`CacheResult::assign`] writes to the cache but leaves the value
/// held here untouched; other handles for the same key are never updated.
pub struct CacheResult<'a, S: CacheStrategy> {
    cache: &'a mut Cache<S>,
    key: S::Key,
    value: Option<S::Value>,
}

impl<'a, S: CacheStrategy> CacheResult<'a, S> {
    pub(crate) fn new(cache: &'a mut Cache<S>, key: S::Key, value: Option<S::Value>) -> Self {
        Self { cache, key, value }
    }

    /// The bound key
    pub fn key(&self) -> &S::Key {
        &self.key
    }

    /// True when the lookup found a value
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// The held value
    pub fn value(&self) -> Option<&S::Value> {
        self.value.as_ref()
    }

    /// The held value, mutably; call [`CacheResult::save`] to persist edits
    pub fn value_mut(&mut self) -> Option<&mut S::Value> {
        self.value.as_mut()
    }

    /// The held value or `default`
    pub fn value_or(&self, default: S::Value) -> S::Value
    where
        S::Value: Clone,
    {
        self.value.clone().unwrap_or(default)
    }

    /// Drop the held value; the cache is not touched
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Replace the held value in place; the cache is not touched
    pub fn emplace(&mut self, value: S::Value) -> &mut S::Value {
        self.value.insert(value)
    }

    /// Write `value` to the cache under the bound key
    pub fn assign(&mut self, value: S::Value) -> &mut Self
    where
        S::Key: Clone,
    {
        self.cache.set(self.key.clone(), value);
        self
    }

    /// Write the held value back to the cache
    ///
    /// Always writes when a value is held, changed or not. Does nothing when
    /// the handle is empty.
    pub fn save(&mut self) -> &mut Self
    where
        S::Key: Clone,
        S::Value: Clone,
    {
        if let Some(value) = &self.value {
            self.cache.set(self.key.clone(), value.clone());
        }
        self
    }

    /// Consume the handle, keeping the value
    pub fn into_value(self) -> Option<S::Value> {
        self.value
    }
}

impl<S: CacheStrategy> Deref for CacheResult<'_, S> {
    type Target = Option<S::Value>;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<S: CacheStrategy> DerefMut for CacheResult<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::MemoryCache;
    use crate::Cache;

    fn key(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn test_assign_does_not_change_handle() {
        let mut cache: MemoryCache<String, i32> = Cache::in_memory(8);
        cache.set(key("k"), 1);

        let mut handle = cache.lookup(key("k"));
        handle.assign(5);
        assert_eq!(handle.value(), Some(&1));

        assert_eq!(cache.get(&key("k")), Some(5));
    }

    #[test]
    fn test_save_writes_edited_value() {
        let mut cache: MemoryCache<String, String> = Cache::in_memory(8);
        cache.set(key("k"), "draft".to_string());

        let mut handle = cache.lookup(key("k"));
        handle.value_mut().unwrap().push_str(" v2");
        handle.save();

        assert_eq!(cache.get(&key("k")).as_deref(), Some("draft v2"));
    }

    #[test]
    fn test_save_counts_as_write() {
        let mut cache: MemoryCache<String, i32> = Cache::in_memory(8);
        cache.set(key("k"), 1);
        let inserts = cache.stats().inserts();

        cache.lookup(key("k")).save();

        assert_eq!(cache.stats().inserts(), inserts + 1);
    }

    #[test]
    fn test_empty_handle_save_is_noop() {
        let mut cache: MemoryCache<String, i32> = Cache::in_memory(8);

        cache.lookup(key("k")).save();

        assert!(!cache.contains(&key("k")));
    }

    #[test]
    fn test_option_like_access() {
        let mut cache: MemoryCache<String, i32> = Cache::in_memory(8);
        cache.set(key("k"), 3);

        let mut handle = cache.lookup(key("k"));
        assert!(handle.is_some());
        assert_eq!(handle.map(|v| v * 2), Some(6));

        handle.reset();
        assert!(handle.is_none());
        *handle.emplace(4) += 1;
        assert_eq!(handle.value_or(0), 5);
        handle.save();

        assert_eq!(cache.get(&key("k")), Some(5));
    }

    #[test]
    fn test_handles_are_independent() {
        let mut cache: MemoryCache<String, i32> = Cache::in_memory(8);
        cache.set(key("k"), 1);

        let old = cache.lookup(key("k")).into_value();
        cache.lookup(key("k")).assign(2);

        assert_eq!(old, Some(1));
        assert_eq!(cache.lookup(key("k")).value(), Some(&2));
    }
}
