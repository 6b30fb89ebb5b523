//! In-memory read/write-through layer in front of another gate

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::mem;

use ahash::RandomState;

use crate::gate::{Bundle, GateBundle, PointerAccess, StorageGate};
use crate::null::NullGate;

/// Memory gate with nothing behind it
pub type VolatileGate<K, V, O = u64> = MemoryGate<NullGate<K, V, O>>;

/// Keeps entries in a hash map and mirrors every write into `inner`
///
/// Reads are served from memory, falling back to `inner` and remembering
/// what it returns. Values handed out by [`PointerAccess::get_ptr`] are
/// marked dirty and written back to `inner` by [`MemoryGate::flush`] or on
/// drop.
pub struct MemoryGate<G>
where
    G: StorageGate,
    G::Key: Hash + Eq + Clone,
    G::Value: Clone,
    G::Options: Clone,
{
    inner: G,
    entries: HashMap<G::Key, (G::Value, G::Options), RandomState>,
    dirty: HashSet<G::Key, RandomState>,
}

impl<G> MemoryGate<G>
where
    G: StorageGate,
    G::Key: Hash + Eq + Clone,
    G::Value: Clone,
    G::Options: Clone,
{
    /// Put a memory layer in front of `inner`
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            entries: HashMap::with_hasher(RandomState::new()),
            dirty: HashSet::with_hasher(RandomState::new()),
        }
    }

    /// The wrapped gate
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Number of entries currently held in memory
    pub fn resident(&self) -> usize {
        self.entries.len()
    }

    /// Write values mutated through `get_ptr` back to the wrapped gate
    pub fn flush(&mut self) {
        for key in mem::take(&mut self.dirty) {
            if let Some((value, options)) = self.entries.get(&key) {
                self.inner.set(key.clone(), value.clone(), options.clone());
            }
        }
    }

    fn load(&mut self, key: &G::Key) -> bool {
        if self.entries.contains_key(key) {
            return true;
        }
        match self.inner.has_or_get(key) {
            Some(bundle) => {
                self.entries
                    .insert(key.clone(), (bundle.value, bundle.options));
                true
            }
            None => false,
        }
    }
}

impl<G> Default for MemoryGate<G>
where
    G: StorageGate + Default,
    G::Key: Hash + Eq + Clone,
    G::Value: Clone,
    G::Options: Clone,
{
    fn default() -> Self {
        Self::new(G::default())
    }
}

impl<G> StorageGate for MemoryGate<G>
where
    G: StorageGate,
    G::Key: Hash + Eq + Clone,
    G::Value: Clone + Default,
    G::Options: Clone,
{
    type Key = G::Key;
    type Value = G::Value;
    type Options = G::Options;
    type Iter<'a>
        = Box<dyn Iterator<Item = (G::Key, G::Value)> + 'a>
    where
        Self: 'a;

    fn has_or_get(&mut self, key: &G::Key) -> Option<GateBundle<Self>> {
        if !self.load(key) {
            return None;
        }
        self.entries
            .get(key)
            .map(|(value, options)| Bundle::new(key.clone(), value.clone(), options.clone()))
    }

    fn set(&mut self, key: G::Key, value: G::Value, options: G::Options) {
        self.inner.set(key.clone(), value.clone(), options.clone());
        self.dirty.remove(&key);
        self.entries.insert(key, (value, options));
    }

    fn set_options(&mut self, key: &G::Key, options: G::Options) {
        let value = if self.load(key) {
            self.entries
                .get(key)
                .map(|(value, _)| value.clone())
                .unwrap_or_default()
        } else {
            G::Value::default()
        };
        self.set(key.clone(), value, options);
    }

    fn erase(&mut self, key: &G::Key) -> bool {
        self.dirty.remove(key);
        let in_memory = self.entries.remove(key).is_some();
        let in_inner = self.inner.erase(key);
        in_memory || in_inner
    }

    fn erase_if<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&GateBundle<Self>) -> bool,
    {
        let mut removed: HashSet<G::Key, RandomState> = HashSet::with_hasher(RandomState::new());
        self.entries.retain(|key, (value, options)| {
            let bundle = Bundle::new(key.clone(), value.clone(), options.clone());
            if predicate(&bundle) {
                removed.insert(bundle.key);
                false
            } else {
                true
            }
        });
        for key in &removed {
            self.dirty.remove(key);
        }

        // Entries still in memory are authoritative; only judge the rest.
        let entries = &self.entries;
        let mut inner_only = 0;
        self.inner.erase_if(|bundle| {
            if removed.contains(&bundle.key) {
                true
            } else if entries.contains_key(&bundle.key) {
                false
            } else if predicate(bundle) {
                inner_only += 1;
                true
            } else {
                false
            }
        });
        removed.len() + inner_only
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.dirty.clear();
        self.inner.clear();
    }

    fn iter(&self) -> Self::Iter<'_> {
        let entries = &self.entries;
        let in_memory = entries
            .iter()
            .map(|(key, (value, _))| (key.clone(), value.clone()));
        let inner_only = self
            .inner
            .iter()
            .filter(move |(key, _)| !entries.contains_key(key));
        Box::new(in_memory.chain(inner_only))
    }
}

impl<G> PointerAccess<G::Key, G::Value> for MemoryGate<G>
where
    G: StorageGate,
    G::Key: Hash + Eq + Clone,
    G::Value: Clone,
    G::Options: Clone,
{
    fn get_ptr(&mut self, key: &G::Key) -> Option<&mut G::Value> {
        if !self.load(key) {
            return None;
        }
        self.dirty.insert(key.clone());
        self.entries.get_mut(key).map(|(value, _)| value)
    }
}

impl<G> Drop for MemoryGate<G>
where
    G: StorageGate,
    G::Key: Hash + Eq + Clone,
    G::Value: Clone,
    G::Options: Clone,
{
    fn drop(&mut self) {
        self.flush();
    }
}
