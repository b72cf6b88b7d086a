//! Weak listener registry
//!
//! Listeners are held by weak reference only, so registration is never the
//! reason a listener stays alive. A handle that no longer resolves is treated
//! as already removed: it is skipped by snapshots and pruned lazily.
//!
//! The map is a `DashMap`, so registration and removal are safe from any
//! thread, including from inside a listener callback. Notification passes
//! work on a [`ListenerRegistry::snapshot`] taken before any callback runs.

use crate::listener::{ItemStateListener, ListenerId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, Weak};

/// Registry of weakly held item-state listeners
pub struct ListenerRegistry {
    entries: DashMap<ListenerId, Weak<dyn ItemStateListener>>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register a listener
    ///
    /// Adding a listener that is already registered leaves exactly one entry.
    /// A dead entry at the same address (a dropped listener whose allocation
    /// was reused) is replaced.
    pub fn add(&self, listener: &Arc<dyn ItemStateListener>) -> ListenerId {
        let id = ListenerId::of(listener);
        match self.entries.entry(id) {
            Entry::Occupied(mut entry) => {
                if entry.get().strong_count() == 0 {
                    entry.insert(Arc::downgrade(listener));
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::downgrade(listener));
            }
        }
        id
    }

    /// Unregister a listener; no-op for unknown ids
    ///
    /// Ids are addresses: do not keep one past its listener's lifetime (see
    /// [`ListenerId`]).
    pub fn remove(&self, id: ListenerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Whether a live listener is registered under `id`
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries
            .get(&id)
            .map(|weak| weak.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }

    /// Check if no live listener is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Resolve every live listener into a strong handle
    ///
    /// The returned vector is independent of the registry: listeners added or
    /// removed afterwards do not affect it. Entries that fail to resolve are
    /// pruned once iteration has released the shard locks.
    pub fn snapshot(&self) -> Vec<Arc<dyn ItemStateListener>> {
        let mut live = Vec::with_capacity(self.entries.len());
        let mut dead = Vec::new();
        for entry in self.entries.iter() {
            match entry.value().upgrade() {
                Some(listener) => live.push(listener),
                None => dead.push(*entry.key()),
            }
        }
        for id in dead {
            self.entries
                .remove_if(&id, |_, weak| weak.strong_count() == 0);
        }
        live
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
