//! Cache façade over a strategy

use std::hash::Hash;

use gatestore::{
    DirectoryGate, DirectoryGateConfig, Lexical, PointerAccess, Result, StorageGate,
    VolatileGate,
};

use crate::lru::LruStrategy;
use crate::result::CacheResult;
use crate::stats::CacheStats;
use crate::strategy::CacheStrategy;

/// LRU cache held entirely in memory; supports pointer access
pub type MemoryCache<K, V> = Cache<LruStrategy<VolatileGate<K, V>>>;

/// LRU cache persisted as one file per entry
pub type DirectoryCache<K, V> = Cache<LruStrategy<DirectoryGate<K, V>>>;

/// Entry point combining a strategy and its gate
///
/// Operations needing stable references (`get_ptr`, `emplace_get_ptr`) only
/// exist when the strategy implements [`PointerAccess`].
pub struct Cache<S> {
    strategy: S,
}

impl<S: CacheStrategy> Cache<S> {
    /// Wrap `strategy`
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Look up `key` and bind the result to this cache
    pub fn lookup(&mut self, key: S::Key) -> CacheResult<'_, S> {
        let value = self.strategy.get(&key);
        CacheResult::new(self, key, value)
    }

    /// Store `value` under `key`
    pub fn set(&mut self, key: S::Key, value: S::Value) -> &mut Self {
        self.strategy.set(key, value);
        self
    }

    /// Fetch the value for `key`
    pub fn get(&mut self, key: &S::Key) -> Option<S::Value> {
        self.strategy.get(key)
    }

    /// Fetch the value for `key`, or `default` on a miss
    pub fn get_or(&mut self, key: &S::Key, default: S::Value) -> S::Value {
        self.strategy.get(key).unwrap_or(default)
    }

    /// Existing value for `key`, or a new one from `make` which is stored
    pub fn emplace_get<F>(&mut self, key: S::Key, make: F) -> CacheResult<'_, S>
    where
        F: FnOnce() -> S::Value,
        S::Key: Clone,
        S::Value: Clone,
    {
        let value = match self.strategy.get(&key) {
            Some(value) => value,
            None => {
                let value = make();
                self.strategy.set(key.clone(), value.clone());
                value
            }
        };
        CacheResult::new(self, key, Some(value))
    }

    /// True if the gate holds `key`; does not count as an access
    pub fn contains(&mut self, key: &S::Key) -> bool {
        self.strategy.gate_mut().has_or_get(key).is_some()
    }

    /// Remove `key`
    pub fn erase(&mut self, key: &S::Key) -> bool {
        self.strategy.erase(key)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.strategy.clear();
    }

    /// Iterate over `(key, value)` pairs without touching recency
    pub fn iter(&self) -> <S::Gate as StorageGate>::Iter<'_> {
        self.strategy.gate().iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.strategy.gate().len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.strategy.gate().is_empty()
    }

    /// Strategy counters
    pub fn stats(&self) -> CacheStats {
        self.strategy.stats()
    }

    /// Zero the strategy counters
    pub fn reset_stats(&mut self) {
        self.strategy.reset_stats();
    }

    /// The strategy
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The strategy, mutably
    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }
}

impl<S> Cache<S>
where
    S: CacheStrategy + PointerAccess<S::Key, S::Value>,
{
    /// Borrow the stored value for `key`
    pub fn get_ptr(&mut self, key: &S::Key) -> Option<&mut S::Value> {
        self.strategy.get_ptr(key)
    }

    /// Borrow the value for `key`, storing one from `make` first if absent
    pub fn emplace_get_ptr<F>(&mut self, key: S::Key, make: F) -> Option<&mut S::Value>
    where
        F: FnOnce() -> S::Value,
        S::Key: Clone,
    {
        if !self.contains(&key) {
            self.strategy.set(key.clone(), make());
        }
        self.strategy.get_ptr(&key)
    }
}

impl<S: Default> Default for Cache<S> {
    fn default() -> Self {
        Self {
            strategy: S::default(),
        }
    }
}

impl<K, V> Cache<LruStrategy<VolatileGate<K, V>>>
where
    K: Hash + Eq + Clone,
    V: Clone + Default,
{
    /// In-memory LRU cache keeping about `max_size` entries
    pub fn in_memory(max_size: u64) -> Self {
        Self::new(LruStrategy::with_capacity(VolatileGate::default(), max_size))
    }
}

impl<K, V> Cache<LruStrategy<DirectoryGate<K, V>>>
where
    K: Lexical + Clone,
    V: Lexical + Default,
{
    /// Directory-backed LRU cache keeping about `max_size` entries
    ///
    /// # Arguments
    /// * `config` - Directory, cache name and file layout
    /// * `max_size` - Capacity of the LRU strategy
    pub fn open_directory(config: DirectoryGateConfig, max_size: u64) -> Result<Self> {
        let gate = DirectoryGate::open(config)?;
        Ok(Self::new(LruStrategy::with_capacity(gate, max_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(s: &str) -> String {
        s.to_string()
    }

    fn directory_cache(dir: &TempDir, max_size: u64) -> DirectoryCache<String, String> {
        Cache::open_directory(
            DirectoryGateConfig::new("cache").with_directory(dir.path()),
            max_size,
        )
        .unwrap()
    }

    #[test]
    fn test_cache_basic() {
        let dir = TempDir::new().unwrap();
        let mut cache = directory_cache(&dir, 10);

        cache
            .set(key("a"), "1".to_string())
            .set(key("b"), "2".to_string());

        assert_eq!(cache.get(&key("a")), Some("1".to_string()));
        assert_eq!(cache.get(&key("missing")), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_get_or() {
        let mut cache: MemoryCache<String, u32> = Cache::in_memory(4);
        cache.set(key("a"), 1);

        assert_eq!(cache.get_or(&key("a"), 9), 1);
        assert_eq!(cache.get_or(&key("b"), 9), 9);
        assert!(!cache.contains(&key("b")));
    }

    #[test]
    fn test_lookup_write_through() {
        let mut cache: MemoryCache<String, i32> = Cache::in_memory(8);

        cache.lookup(key("one")).assign(1);
        cache.lookup(key("two")).assign(2);

        let one = cache.lookup(key("one"));
        assert_eq!(one.value(), Some(&1));
        assert_eq!(one.key(), "one");
        assert_eq!(cache.lookup(key("two")).value(), Some(&2));
    }

    #[test]
    fn test_lookup_miss() {
        let mut cache: MemoryCache<String, i32> = Cache::in_memory(8);
        let missing = cache.lookup(key("nothing"));

        assert!(!missing.has_value());
        assert_eq!(missing.value_or(-1), -1);
    }

    #[test]
    fn test_emplace_get() {
        let dir = TempDir::new().unwrap();
        let mut cache = directory_cache(&dir, 10);
        let mut calls = 0;

        let first = cache
            .emplace_get(key("k"), || {
                calls += 1;
                "made".to_string()
            })
            .into_value();
        let second = cache
            .emplace_get(key("k"), || {
                calls += 1;
                "again".to_string()
            })
            .into_value();

        assert_eq!(first.as_deref(), Some("made"));
        assert_eq!(second.as_deref(), Some("made"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_get_ptr_is_stable() {
        let mut cache: MemoryCache<String, Vec<u32>> = Cache::in_memory(8);
        cache.set(key("list"), vec![1]);

        cache.get_ptr(&key("list")).unwrap().push(2);

        assert_eq!(cache.get(&key("list")), Some(vec![1, 2]));
        assert!(cache.get_ptr(&key("other")).is_none());
    }

    #[test]
    fn test_emplace_get_ptr() {
        let mut cache: MemoryCache<String, Vec<u32>> = Cache::in_memory(8);

        cache.emplace_get_ptr(key("list"), Vec::new).unwrap().push(7);
        cache.emplace_get_ptr(key("list"), || vec![0]).unwrap().push(8);

        assert_eq!(cache.get(&key("list")), Some(vec![7, 8]));
    }

    #[test]
    fn test_iter_and_clear() {
        let dir = TempDir::new().unwrap();
        let mut cache = directory_cache(&dir, 10);
        cache.set(key("a"), "1".to_string());
        cache.set(key("b"), "2".to_string());

        let mut entries: Vec<_> = cache.iter().collect();
        entries.sort();
        assert_eq!(entries[0], (key("a"), "1".to_string()));
        assert_eq!(entries.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_erase() {
        let mut cache: MemoryCache<u64, String> = Cache::default();
        cache.set(1, "one".to_string());

        assert!(cache.erase(&1));
        assert!(!cache.erase(&1));
        assert_eq!(cache.strategy().max_size(), crate::lru::DEFAULT_MAX_SIZE);
    }

    #[test]
    fn test_eviction_through_facade() {
        let dir = TempDir::new().unwrap();
        let mut cache = directory_cache(&dir, 3);

        cache.set(key("one"), "hello".to_string());
        cache.set(key("one"), "hello 2".to_string());
        assert_eq!(cache.lookup(key("one")).value().map(String::as_str), Some("hello 2"));
        for name in ["two", "three", "four", "five"] {
            cache.set(key(name), name.to_string());
        }

        assert!(!cache.contains(&key("one")));
        assert!(!cache.contains(&key("two")));
        assert!(cache.contains(&key("three")));
        assert!(cache.contains(&key("four")));
        assert!(cache.contains(&key("five")));
    }

    #[test]
    fn test_directory_cache_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut cache = directory_cache(&dir, 10);
            cache.set(key("k"), "v".to_string());
        }
        let mut cache = directory_cache(&dir, 10);
        assert_eq!(cache.get(&key("k")), Some("v".to_string()));
    }
}
