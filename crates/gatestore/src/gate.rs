//! Storage gate contract
//!
//! A gate persists `(key, value, options)` bundles. The options slot belongs
//! to whatever strategy sits on top (the LRU strategy keeps its logical
//! timestamp there). Gates never return errors: failures go to the gate's
//! logger and surface as a miss or `false`.
//!
//! Gates are single-owner. `set_options` is a read followed by a write and
//! no gate in this crate locks between the two; a gate shared between
//! processes needs its own locking or a copy-on-write scheme.

/// A stored entry, returned by value from a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle<K, V, O> {
    /// Entry key
    pub key: K,
    /// Stored value
    pub value: V,
    /// Strategy metadata
    pub options: O,
}

impl<K, V, O> Bundle<K, V, O> {
    /// Create a bundle
    pub fn new(key: K, value: V, options: O) -> Self {
        Self {
            key,
            value,
            options,
        }
    }
}

/// Bundle type produced by a gate
pub type GateBundle<G> =
    Bundle<<G as StorageGate>::Key, <G as StorageGate>::Value, <G as StorageGate>::Options>;

/// Pluggable persistence backend
pub trait StorageGate {
    /// Entry key
    type Key;
    /// Stored value
    type Value;
    /// Per-entry strategy metadata
    type Options;
    /// Iterator over `(key, value)` pairs owned by this gate
    type Iter<'a>: Iterator<Item = (Self::Key, Self::Value)> + 'a
    where
        Self: 'a;

    /// Look up a bundle; `None` when absent or unreadable
    fn has_or_get(&mut self, key: &Self::Key) -> Option<GateBundle<Self>>;

    /// Create or replace the bundle for `key`
    fn set(&mut self, key: Self::Key, value: Self::Value, options: Self::Options);

    /// Replace only the options of `key`, keeping its value
    ///
    /// An absent key is stored with a default value.
    fn set_options(&mut self, key: &Self::Key, options: Self::Options);

    /// Remove `key`, returning whether an entry was removed
    fn erase(&mut self, key: &Self::Key) -> bool;

    /// Remove every bundle matching `predicate`, returning how many went
    fn erase_if<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&GateBundle<Self>) -> bool;

    /// Remove every entry owned by this gate
    fn clear(&mut self) {
        self.erase_if(|_| true);
    }

    /// Iterate over the entries owned by this gate
    fn iter(&self) -> Self::Iter<'_>;

    /// Number of readable entries
    fn len(&self) -> usize {
        self.iter().count()
    }

    /// True when no readable entry exists
    fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Backends able to hand out a stable mutable reference to a stored value
///
/// Mutations through the reference are visible to later reads. Backends that
/// rebuild values on every read (the directory gate) do not implement this,
/// so asking them for a pointer fails to type-check.
pub trait PointerAccess<K, V> {
    /// Borrow the stored value for `key`
    fn get_ptr(&mut self, key: &K) -> Option<&mut V>;
}
