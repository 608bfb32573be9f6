//! Memoization of lazy entries.
//!
//! Each lazy entry gets its own [`Slot`], created on first access and keyed by
//! [`EntryId`]. A slot moves through `Empty -> InProgress -> Materialized`:
//!
//! - the first caller takes the slot lock and runs the factory (`InProgress`);
//! - concurrent callers for the same entry block on that lock, then read the result;
//! - a failed factory leaves the slot `Empty`, so the next caller retries.
//!
//! Unrelated entries never share a lock. Eager entries bypass the cache.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::entry::{Entry, EntryId};
use crate::error::RegistryError;
use crate::lookup::{Candidate, Lookup};
use crate::type_key::{Object, TypeKey};

/// Cache slot for one lazy entry. `None` is `Empty`; holding the lock is `InProgress`.
#[derive(Default)]
pub struct Slot {
    value: Mutex<Option<Object>>,
}

impl Slot {
    pub(crate) fn get_or_materialize(&self, entry: &dyn Entry) -> Result<Object, RegistryError> {
        let mut value = self.value.lock();
        if let Some(cached) = value.as_ref() {
            return Ok(Arc::clone(cached));
        }

        tracing::trace!(
            type_key = %entry.declared(),
            entry = ?entry.id(),
            "Materializing lazy registry entry"
        );
        let fresh = entry.materialize()?;
        *value = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    #[cfg(test)]
    fn is_materialized(&self) -> bool {
        self.value.lock().is_some()
    }
}

/// Decorator memoizing the value of every lazy entry exposed by `L`.
///
/// Candidates that already carry a slot (for example, parent entries of a
/// [`HierarchicalRegistry`](crate::HierarchicalRegistry) built from cached
/// registries) keep it; no second caching layer is added.
pub struct CachingRegistry<L> {
    inner: L,
    slots: DashMap<EntryId, Arc<Slot>>,
}

impl<L: Lookup> CachingRegistry<L> {
    #[must_use]
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            slots: DashMap::new(),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Number of lazy entries that have been accessed at least once.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn attach(&self, candidate: Candidate) -> Candidate {
        if !candidate.is_lazy() || candidate.is_cached() {
            return candidate;
        }
        let slot = Arc::clone(self.slots.entry(candidate.entry_id()).or_default().value());
        candidate.with_slot(slot)
    }
}

impl<L: Lookup> Lookup for CachingRegistry<L> {
    fn find(&self, key: TypeKey) -> Option<Candidate> {
        self.inner.find(key).map(|c| self.attach(c))
    }

    fn find_all(&self, key: TypeKey) -> Vec<Candidate> {
        self.inner
            .find_all(key)
            .into_iter()
            .map(|c| self.attach(c))
            .collect()
    }
}
