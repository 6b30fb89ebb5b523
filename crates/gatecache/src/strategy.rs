//! Cache strategy contract

use gatestore::StorageGate;

use crate::stats::CacheStats;

/// Eviction policy layered on top of a [`StorageGate`]
///
/// The strategy owns its gate. Reads and writes go through the strategy so
/// it can keep its bookkeeping in the gate's options slot; bulk access
/// (iteration, length) goes straight to the gate.
pub trait CacheStrategy {
    /// Entry key
    type Key;
    /// Stored value
    type Value;
    /// Backend
    type Gate: StorageGate<Key = Self::Key, Value = Self::Value>;

    /// Fetch a value, recording the access
    fn get(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Store a value, possibly evicting others
    fn set(&mut self, key: Self::Key, value: Self::Value);

    /// Remove `key`
    fn erase(&mut self, key: &Self::Key) -> bool {
        self.gate_mut().erase(key)
    }

    /// Remove every entry
    fn clear(&mut self) {
        self.gate_mut().clear();
    }

    /// The backend
    fn gate(&self) -> &Self::Gate;

    /// The backend, mutably
    fn gate_mut(&mut self) -> &mut Self::Gate;

    /// Counters for this strategy
    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    /// Zero the counters
    fn reset_stats(&mut self) {}
}
