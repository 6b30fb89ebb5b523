//! LRU (Least Recently Used) strategy
//!
//! Recency is a logical clock: every write and every successful read stamps
//! the entry with `next_usage` and advances it. The stamp lives in the
//! gate's options slot, so it persists with the entry.
//!
//! Eviction is a threshold pass run after writes only. Once `next_usage`
//! exceeds `max_size`, every entry stamped below `next_usage - max_size` is
//! erased. Reads refresh stamps but never evict.

use gatestore::{PointerAccess, StorageGate};

use crate::stats::CacheStats;
use crate::strategy::CacheStrategy;

/// Capacity used by [`LruStrategy::new`]
pub const DEFAULT_MAX_SIZE: u64 = 1024;

/// Approximate LRU over any gate whose options are a `u64` stamp
pub struct LruStrategy<G> {
    gate: G,
    max_size: u64,
    next_usage: u64,
    stats: CacheStats,
}

impl<G> LruStrategy<G>
where
    G: StorageGate<Options = u64>,
{
    /// Wrap `gate` with the default capacity
    pub fn new(gate: G) -> Self {
        Self::with_capacity(gate, DEFAULT_MAX_SIZE)
    }

    /// Wrap `gate`, keeping roughly `max_size` entries (at least 1)
    pub fn with_capacity(gate: G, max_size: u64) -> Self {
        Self {
            gate,
            max_size: max_size.max(1),
            next_usage: 1,
            stats: CacheStats::new(),
        }
    }

    /// Capacity
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Stamp the next access will receive
    pub fn next_usage(&self) -> u64 {
        self.next_usage
    }

    fn tick(&mut self) -> u64 {
        let stamp = self.next_usage;
        self.next_usage += 1;
        stamp
    }

    fn touch(&mut self, key: &G::Key) {
        let stamp = self.tick();
        self.gate.set_options(key, stamp);
    }

    fn clean_up(&mut self) {
        if self.next_usage <= self.max_size {
            return;
        }
        let break_index = self.next_usage - self.max_size;
        let evicted = self.gate.erase_if(|bundle| bundle.options < break_index);
        self.stats.record_evictions(evicted);
    }
}

impl<G> Default for LruStrategy<G>
where
    G: StorageGate<Options = u64> + Default,
{
    fn default() -> Self {
        Self::new(G::default())
    }
}

impl<G> CacheStrategy for LruStrategy<G>
where
    G: StorageGate<Options = u64>,
{
    type Key = G::Key;
    type Value = G::Value;
    type Gate = G;

    fn get(&mut self, key: &G::Key) -> Option<G::Value> {
        match self.gate.has_or_get(key) {
            Some(bundle) => {
                self.touch(key);
                self.stats.record_hit();
                Some(bundle.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    fn set(&mut self, key: G::Key, value: G::Value) {
        let stamp = self.tick();
        self.gate.set(key, value, stamp);
        self.stats.record_insert();
        self.clean_up();
    }

    fn gate(&self) -> &G {
        &self.gate
    }

    fn gate_mut(&mut self) -> &mut G {
        &mut self.gate
    }

    fn stats(&self) -> CacheStats {
        self.stats
    }

    fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

impl<G> PointerAccess<G::Key, G::Value> for LruStrategy<G>
where
    G: StorageGate<Options = u64>,
    G: PointerAccess<<G as StorageGate>::Key, <G as StorageGate>::Value>,
{
    fn get_ptr(&mut self, key: &G::Key) -> Option<&mut G::Value> {
        if self.gate.get_ptr(key).is_none() {
            self.stats.record_miss();
            return None;
        }
        self.touch(key);
        self.stats.record_hit();
        self.gate.get_ptr(key)
    }
}
