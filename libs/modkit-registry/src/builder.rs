use std::fmt;
use std::sync::Arc;

use crate::caching::CachingRegistry;
use crate::entry::{Entry, TypedEntry};
use crate::lookup::LookupEngine;
use crate::registry::Registry;
use crate::type_key::TypeToken;

/// Mutable accumulator of registry entries.
///
/// [`RegistryBuilder::build`] snapshots the entries added so far; the builder
/// can keep growing afterwards without affecting snapshots already taken.
/// Builders are meant for single-threaded construction.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<Arc<dyn Entry>>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an eager entry declared at the value's own type.
    pub fn add<T>(&mut self, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.add_as(TypeToken::<T>::of(), Arc::new(value))
    }

    /// Adds an eager entry at the declared type described by `token`.
    pub fn add_as<T>(&mut self, token: TypeToken<T>, value: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries.push(Arc::new(TypedEntry::eager(token, value)));
        self
    }

    /// Adds a lazy entry; `factory` runs on first resolution, not here.
    pub fn add_lazy<T, F>(&mut self, token: TypeToken<T>, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    {
        self.entries
            .push(Arc::new(TypedEntry::lazy(token, Arc::new(factory))));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshots the current entries into a caching registry.
    ///
    /// Every call yields an independent registry with its own cache slots.
    #[must_use]
    pub fn build(&self) -> Registry {
        tracing::debug!(entries = self.entries.len(), "Building registry snapshot");
        let engine = LookupEngine::new(Arc::from(self.entries.as_slice()));
        Registry::from_lookup(Arc::new(CachingRegistry::new(engine)))
    }

    /// Like [`RegistryBuilder::build`], then chains the snapshot in front of `parent`.
    #[must_use]
    pub fn build_with_parent(&self, parent: &Registry) -> Registry {
        Registry::join(parent, &self.build())
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("entries", &self.entries.len())
            .finish()
    }
}
