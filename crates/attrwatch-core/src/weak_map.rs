#![forbid(unsafe_code)]

//! Identity-keyed maps that hold their keys weakly.
//!
//! # Design
//!
//! [`WeakKeyMap`] indexes entries by the address of the key's shared
//! allocation and stores a [`Weak`] probe next to each value. Holding the
//! probe keeps the allocation (not the value) reserved, so the address
//! cannot be reused by another key while the entry exists. A lookup with a
//! live key therefore always lands on that key's own entry.
//!
//! Entries whose key has been dropped stay in the table until a sweep.
//! Sweeps run lazily after `sweep_threshold` insertions, or explicitly via
//! [`WeakKeyMap::sweep`].
//!
//! # Invariants
//!
//! 1. No entry keeps its key's value alive.
//! 2. Dead entries are never returned from lookups or iteration.
//! 3. [`len`](WeakKeyMap::len) counts live entries only.

use std::any::Any;
use std::fmt;
use std::rc::Weak;

use ahash::AHashMap;

/// Default number of insertions between automatic sweeps.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 64;

/// A shared handle whose identity is the address of its allocation.
pub trait Identity {
    /// Address of the shared allocation.
    fn identity(&self) -> usize;

    /// Liveness probe for the shared allocation.
    fn downgrade_any(&self) -> Weak<dyn Any>;
}

struct Slot<V> {
    probe: Weak<dyn Any>,
    value: V,
}

impl<V> Slot<V> {
    fn is_alive(&self) -> bool {
        self.probe.strong_count() > 0
    }
}

/// Map from identity handles to values, not owning the handles.
pub struct WeakKeyMap<V> {
    slots: AHashMap<usize, Slot<V>>,
    inserts_since_sweep: usize,
    sweep_threshold: usize,
}

impl<V> Default for WeakKeyMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> WeakKeyMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }

    /// Create a map that sweeps dead entries every `threshold` insertions.
    ///
    /// A threshold of zero is treated as one.
    #[must_use]
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        Self {
            slots: AHashMap::new(),
            inserts_since_sweep: 0,
            sweep_threshold: threshold.max(1),
        }
    }

    #[must_use]
    pub fn get<K: Identity>(&self, key: &K) -> Option<&V> {
        self.slots.get(&key.identity()).map(|slot| &slot.value)
    }

    #[must_use]
    pub fn get_mut<K: Identity>(&mut self, key: &K) -> Option<&mut V> {
        self.slots.get_mut(&key.identity()).map(|slot| &mut slot.value)
    }

    #[must_use]
    pub fn contains_key<K: Identity>(&self, key: &K) -> bool {
        self.slots.contains_key(&key.identity())
    }

    /// Insert a value, returning the one previously stored for `key`.
    pub fn insert<K: Identity>(&mut self, key: &K, value: V) -> Option<V> {
        self.note_insert();
        let slot = Slot {
            probe: key.downgrade_any(),
            value,
        };
        self.slots.insert(key.identity(), slot).map(|old| old.value)
    }

    /// Fetch the value for `key`, inserting `make()` first if absent.
    pub fn get_or_insert_with<K: Identity>(&mut self, key: &K, make: impl FnOnce() -> V) -> &mut V {
        let id = key.identity();
        if !self.slots.contains_key(&id) {
            self.note_insert();
        }
        &mut self
            .slots
            .entry(id)
            .or_insert_with(|| Slot {
                probe: key.downgrade_any(),
                value: make(),
            })
            .value
    }

    pub fn remove<K: Identity>(&mut self, key: &K) -> Option<V> {
        self.slots.remove(&key.identity()).map(|slot| slot.value)
    }

    /// Number of entries whose key is still alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_alive()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values whose key is still alive, in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots
            .values()
            .filter(|slot| slot.is_alive())
            .map(|slot| &slot.value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.slots
            .values_mut()
            .filter(|slot| slot.is_alive())
            .map(|slot| &mut slot.value)
    }

    /// Keep only the live entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut V) -> bool) {
        self.slots
            .retain(|_, slot| slot.is_alive() && keep(&mut slot.value));
    }

    /// Drop every entry whose key has been reclaimed. Returns the number
    /// removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.is_alive());
        self.inserts_since_sweep = 0;
        let removed = before - self.slots.len();
        #[cfg(feature = "tracing")]
        if removed > 0 {
            tracing::trace!(message = "weak_map.sweep", removed, remaining = self.slots.len());
        }
        removed
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.inserts_since_sweep = 0;
    }

    fn note_insert(&mut self) {
        self.inserts_since_sweep += 1;
        if self.inserts_since_sweep >= self.sweep_threshold {
            self.sweep();
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for WeakKeyMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakKeyMap")
            .field("live", &self.len())
            .field("slots", &self.slots.len())
            .field("sweep_threshold", &self.sweep_threshold)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
