use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp;
use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeSet;
#[cfg(feature = "std")]
use std::collections::HashSet;

use flowlist::IdentityKey;

#[cfg(feature = "std")]
type IdentitySet<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
type IdentitySet<K> = BTreeSet<K>;

/// One stored item: the caller's payload plus its identity.
///
/// The identity is assigned by the caller and never mutated while the entry is
/// present.
#[derive(Clone, Debug)]
pub struct StoreEntry<K, T> {
    pub key: K,
    pub item: T,
}

/// A change notification raised synchronously after a store mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent<K> {
    Inserted { key: K, index: usize },
    Removed { index: usize, count: usize },
    Replaced { len: usize },
}

/// A store change listener. Registration is append-only; every listener fires,
/// in registration order, synchronously with the mutation.
pub type StoreListener<K> = Arc<dyn Fn(&StoreEvent<K>) + Send + Sync>;

/// An ordered item collection keyed by stable identity.
///
/// Items are held in rendering order. Mutations that violate the contract
/// (out-of-range index, duplicate identity) are logged no-ops rather than
/// panics.
pub struct DataStore<K, T> {
    entries: Vec<StoreEntry<K, T>>,
    ids: IdentitySet<K>,
    listeners: Vec<StoreListener<K>>,
}

impl<K: IdentityKey, T> DataStore<K, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            ids: IdentitySet::<K>::default(),
            listeners: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a change listener. Listeners cannot be removed; hosts that need
    /// dynamic subscriptions wrap the callback in their own gate.
    pub fn subscribe(&mut self, listener: StoreListener<K>) {
        self.listeners.push(listener);
    }

    /// Splices `item` in at `index` and indexes it by identity.
    ///
    /// Rejects an index outside `[0, len]` or an identity that already exists;
    /// both are logged no-ops returning `false`.
    pub fn insert(&mut self, index: usize, key: K, item: T) -> bool {
        if index > self.entries.len() {
            fwarn!(index, len = self.entries.len(), "insert: index out of range");
            return false;
        }
        if !self.ids.insert(key.clone()) {
            fwarn!(index, "insert: identity already present");
            return false;
        }
        self.entries.insert(
            index,
            StoreEntry {
                key: key.clone(),
                item,
            },
        );
        self.emit(&StoreEvent::Inserted { key, index });
        true
    }

    /// Removes `count` items starting at `index`, purging their identities from
    /// the lookup set first. An out-of-range start is a logged no-op; the count
    /// is clamped to the tail. Returns the number of items removed.
    pub fn remove(&mut self, index: usize, count: usize) -> usize {
        if index >= self.entries.len() {
            fwarn!(index, len = self.entries.len(), "remove: index out of range");
            return 0;
        }
        let end = cmp::min(self.entries.len(), index.saturating_add(count));
        for entry in &self.entries[index..end] {
            self.ids.remove(&entry.key);
        }
        self.entries.drain(index..end);
        let removed = end - index;
        if removed > 0 {
            self.emit(&StoreEvent::Removed {
                index,
                count: removed,
            });
        }
        removed
    }

    /// Replaces the whole collection.
    ///
    /// A dataset carrying a duplicate identity is invalid: it is logged and the
    /// store proceeds empty rather than half-populated. Returns whether the
    /// dataset was accepted.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = (K, T)>) -> bool {
        let mut next = Vec::new();
        let mut ids = IdentitySet::<K>::default();
        let mut valid = true;
        for (key, item) in entries {
            if !ids.insert(key.clone()) {
                fwarn!(index = next.len(), "replace_all: duplicate identity");
                valid = false;
                break;
            }
            next.push(StoreEntry { key, item });
        }
        if !valid {
            next.clear();
            ids.clear();
        }
        self.entries = next;
        self.ids = ids;
        fdebug!(len = self.entries.len(), valid, "replace_all");
        self.emit(&StoreEvent::Replaced {
            len: self.entries.len(),
        });
        valid
    }

    pub fn get(&self, key: &K) -> Option<&T> {
        if !self.ids.contains(key) {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| &entry.key == key)
            .map(|entry| &entry.item)
    }

    pub fn get_at(&self, index: usize) -> Option<&StoreEntry<K, T>> {
        self.entries.get(index)
    }

    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.entries.get(index).map(|entry| &entry.key)
    }

    pub fn position_of(&self, key: &K) -> Option<usize> {
        if !self.ids.contains(key) {
            return None;
        }
        self.entries.iter().position(|entry| &entry.key == key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.ids.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoreEntry<K, T>> {
        self.entries.iter()
    }

    fn emit(&self, event: &StoreEvent<K>) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl<K: IdentityKey, T> Default for DataStore<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IdentityKey + fmt::Debug, T> fmt::Debug for DataStore<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("len", &self.entries.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
