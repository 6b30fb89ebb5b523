//! Gate that stores nothing

use std::fmt;
use std::iter;
use std::marker::PhantomData;

use crate::gate::{GateBundle, StorageGate};

/// Sentinel backend: every write is dropped and every read misses
///
/// Useful as the innermost layer of a [`MemoryGate`](crate::MemoryGate) when
/// nothing should outlive the process.
pub struct NullGate<K, V, O = u64> {
    _marker: PhantomData<fn() -> (K, V, O)>,
}

impl<K, V, O> NullGate<K, V, O> {
    /// Create a null gate
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V, O> Default for NullGate<K, V, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, O> fmt::Debug for NullGate<K, V, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NullGate")
    }
}

impl<K, V, O> StorageGate for NullGate<K, V, O> {
    type Key = K;
    type Value = V;
    type Options = O;
    type Iter<'a>
        = iter::Empty<(K, V)>
    where
        Self: 'a;

    fn has_or_get(&mut self, _key: &K) -> Option<GateBundle<Self>> {
        None
    }

    fn set(&mut self, _key: K, _value: V, _options: O) {}

    fn set_options(&mut self, _key: &K, _options: O) {}

    fn erase(&mut self, _key: &K) -> bool {
        false
    }

    fn erase_if<F>(&mut self, _predicate: F) -> usize
    where
        F: FnMut(&GateBundle<Self>) -> bool,
    {
        0
    }

    fn clear(&mut self) {}

    fn iter(&self) -> Self::Iter<'_> {
        iter::empty()
    }

    fn len(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_gate_forgets_everything() {
        let mut gate: NullGate<String, String> = NullGate::new();

        gate.set("k".to_string(), "v".to_string(), 1);
        gate.set_options(&"k".to_string(), 2);

        assert!(gate.has_or_get(&"k".to_string()).is_none());
        assert!(!gate.erase(&"k".to_string()));
        assert_eq!(gate.erase_if(|_| true), 0);
        assert!(gate.is_empty());
        gate.clear();
    }
}
