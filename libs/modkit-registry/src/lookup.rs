//! The shared lookup capability and the plain lookup engine.

use std::sync::Arc;

use crate::caching::Slot;
use crate::entry::{Entry, EntryId};
use crate::error::RegistryError;
use crate::type_key::{Object, TypeKey};

/// Capability shared by every registry layer: resolve a type to zero, one or
/// many candidates.
///
/// Implemented by [`LookupEngine`], [`CachingRegistry`](crate::CachingRegistry)
/// and [`HierarchicalRegistry`](crate::HierarchicalRegistry). Layers compose by
/// holding the layer they wrap; none of them mutates after construction.
pub trait Lookup: Send + Sync {
    /// The candidate a singular lookup resolves to, if any entry matches.
    fn find(&self, key: TypeKey) -> Option<Candidate>;

    /// Every matching candidate, in the order multi-result lookups yield them.
    fn find_all(&self, key: TypeKey) -> Vec<Candidate>;
}

impl<L: Lookup + ?Sized> Lookup for Arc<L> {
    fn find(&self, key: TypeKey) -> Option<Candidate> {
        (**self).find(key)
    }

    fn find_all(&self, key: TypeKey) -> Vec<Candidate> {
        (**self).find_all(key)
    }
}

/// A matching entry, optionally paired with the cache slot that memoizes it.
#[derive(Clone)]
pub struct Candidate {
    entry: Arc<dyn Entry>,
    slot: Option<Arc<Slot>>,
}

impl Candidate {
    pub(crate) fn new(entry: Arc<dyn Entry>) -> Self {
        Self { entry, slot: None }
    }

    pub(crate) fn with_slot(self, slot: Arc<Slot>) -> Self {
        Self {
            entry: self.entry,
            slot: Some(slot),
        }
    }

    #[must_use]
    pub fn entry_id(&self) -> EntryId {
        self.entry.id()
    }

    #[must_use]
    pub fn declared(&self) -> TypeKey {
        self.entry.declared()
    }

    #[must_use]
    pub fn is_lazy(&self) -> bool {
        self.entry.is_lazy()
    }

    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.slot.is_some()
    }

    /// Materializes the entry (through its slot when cached) and views it as `requested`.
    pub(crate) fn resolve(&self, requested: TypeKey) -> Result<Object, RegistryError> {
        let value = match &self.slot {
            Some(slot) => slot.get_or_materialize(self.entry.as_ref())?,
            None => self.entry.materialize()?,
        };
        self.entry.view(&value, requested)
    }
}

/// Ordered, immutable entry sequence plus the type-matching rules.
///
/// - `find`: the most recently added matching entry wins.
/// - `find_all`: every matching entry, oldest first.
///
/// Lazy entries are not memoized here; every resolution invokes the factory.
pub struct LookupEngine {
    entries: Arc<[Arc<dyn Entry>]>,
}

impl LookupEngine {
    pub(crate) fn new(entries: Arc<[Arc<dyn Entry>]>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lookup for LookupEngine {
    fn find(&self, key: TypeKey) -> Option<Candidate> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.matches(key))
            .map(|e| Candidate::new(Arc::clone(e)))
    }

    fn find_all(&self, key: TypeKey) -> Vec<Candidate> {
        self.entries
            .iter()
            .filter(|e| e.matches(key))
            .map(|e| Candidate::new(Arc::clone(e)))
            .collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::entry::TypedEntry;
    use crate::type_key::TypeToken;

    fn engine(entries: Vec<Arc<dyn Entry>>) -> LookupEngine {
        LookupEngine::new(entries.into())
    }

    fn text(value: &'static str) -> Arc<dyn Entry> {
        Arc::new(TypedEntry::eager(
            TypeToken::<&'static str>::of(),
            Arc::new(value),
        ))
    }

    fn read(candidate: &Candidate) -> &'static str {
        let value = candidate.resolve(TypeKey::of::<&'static str>()).unwrap();
        **value.downcast_ref::<Arc<&'static str>>().unwrap()
    }

    #[test]
    fn find_prefers_most_recent_entry() {
        let engine = engine(vec![text("a"), text("b")]);
        let found = engine.find(TypeKey::of::<&'static str>()).unwrap();
        assert_eq!(read(&found), "b");
    }

    #[test]
    fn find_all_keeps_insertion_order() {
        let engine = engine(vec![text("a"), text("b"), text("c")]);
        let all: Vec<_> = engine
            .find_all(TypeKey::of::<&'static str>())
            .iter()
            .map(read)
            .collect();
        assert_eq!(all, vec!["a", "b", "c"]);
    }

    #[test]
    fn unmatched_type_yields_nothing() {
        let engine = engine(vec![text("a")]);
        assert!(engine.find(TypeKey::of::<u64>()).is_none());
        assert!(engine.find_all(TypeKey::of::<u64>()).is_empty());
    }

    #[test]
    fn engine_candidates_are_uncached() {
        let engine = engine(vec![text("a")]);
        let found = engine.find(TypeKey::of::<&'static str>()).unwrap();
        assert!(!found.is_cached());
        assert!(!found.is_lazy());
        assert_eq!(engine.len(), 1);
    }
}
