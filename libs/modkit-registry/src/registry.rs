//! Typed, read-only handle over a composed registry.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::builder::RegistryBuilder;
use crate::error::RegistryError;
use crate::hierarchy::HierarchicalRegistry;
use crate::lookup::{Candidate, Lookup, LookupEngine};
use crate::type_key::{Object, TypeKey};

/// Immutable, type-keyed registry.
///
/// Cloning is cheap and clones share the same entries and cache slots. A
/// `Registry` never exposes a mutation operation; build a new one with
/// [`RegistryBuilder`] or chain one in front of another with [`Registry::join`].
///
/// Values are requested by type and handed out as `Arc<T>`, where `T` may be a
/// trait object:
///
/// ```ignore
/// let registry = Registry::builder()
///     .add_as(TypeToken::<English>::of().extends::<dyn Greeter>(|v| v), Arc::new(English))
///     .build();
/// let greeter = registry.get::<dyn Greeter>()?;
/// ```
#[derive(Clone)]
pub struct Registry {
    lookup: Arc<dyn Lookup>,
}

impl Registry {
    /// Wraps an already composed lookup chain.
    #[must_use]
    pub fn from_lookup(lookup: Arc<dyn Lookup>) -> Self {
        Self { lookup }
    }

    /// A registry with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_lookup(Arc::new(LookupEngine::new(Arc::from(Vec::new()))))
    }

    /// A registry holding exactly one eager entry, declared at `T`.
    #[must_use]
    pub fn single<T: Send + Sync + 'static>(value: T) -> Self {
        RegistryBuilder::new().add(value).build()
    }

    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Chains `child` in front of `parent`: child entries take precedence and
    /// unmatched lookups fall back to the parent.
    #[must_use]
    pub fn join(parent: &Registry, child: &Registry) -> Self {
        tracing::debug!("Joining registry into parent chain");
        Self::from_lookup(Arc::new(HierarchicalRegistry::new(
            Arc::clone(&parent.lookup),
            Arc::clone(&child.lookup),
        )))
    }

    #[must_use]
    pub fn lookup(&self) -> &Arc<dyn Lookup> {
        &self.lookup
    }

    /// Resolves `T`, preferring the most recently added matching entry.
    ///
    /// # Errors
    /// - [`RegistryError::NotFound`] if no entry in the chain matches `T`.
    /// - [`RegistryError::Factory`] if the matching lazy entry's factory fails.
    pub fn get<T>(&self) -> Result<Arc<T>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        let candidate = self
            .lookup
            .find(key)
            .ok_or(RegistryError::NotFound { type_key: key })?;
        downcast(&candidate.resolve(key)?, key)
    }

    /// Like [`Registry::get`], but returns `Ok(None)` when nothing matches.
    ///
    /// # Errors
    /// Returns [`RegistryError::Factory`] if the matching lazy entry's factory fails.
    pub fn first<T>(&self) -> Result<Option<Arc<T>>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        self.lookup
            .find(key)
            .map(|candidate| downcast(&candidate.resolve(key)?, key))
            .transpose()
    }

    /// Every value matching `T`, oldest registration first, children before parents.
    ///
    /// Values are materialized while iterating, never up front.
    #[must_use]
    pub fn get_all<T>(&self) -> Matches<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        Matches {
            key,
            candidates: self.lookup.find_all(key),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if some entry matches `T`. Never runs a factory.
    #[must_use]
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.lookup.find(TypeKey::of::<T>()).is_some()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

fn downcast<T>(value: &Object, key: TypeKey) -> Result<Arc<T>, RegistryError>
where
    T: ?Sized + Send + Sync + 'static,
{
    value
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(RegistryError::TypeMismatch { type_key: key })
}

/// Restartable sequence of the values matching one type.
///
/// Each call to [`Matches::iter`] walks the matches again; cached lazy entries
/// are not re-materialized, uncached ones are.
pub struct Matches<T: ?Sized> {
    key: TypeKey,
    candidates: Vec<Candidate>,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T> Matches<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    /// Number of matching entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> MatchesIter<'_, T> {
        MatchesIter {
            key: self.key,
            candidates: self.candidates.iter(),
            failed: false,
            _marker: PhantomData,
        }
    }

    /// Materializes every match.
    ///
    /// # Errors
    /// Returns the first factory failure; later entries are not materialized.
    pub fn to_vec(&self) -> Result<Vec<Arc<T>>, RegistryError> {
        self.iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a Matches<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    type Item = Result<Arc<T>, RegistryError>;
    type IntoIter = MatchesIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: ?Sized> fmt::Debug for Matches<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matches")
            .field("key", &self.key)
            .field("len", &self.candidates.len())
            .finish_non_exhaustive()
    }
}

/// Iterator over [`Matches`]. Stops for good after yielding the first error.
pub struct MatchesIter<'a, T: ?Sized> {
    key: TypeKey,
    candidates: std::slice::Iter<'a, Candidate>,
    failed: bool,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T> Iterator for MatchesIter<'_, T>
where
    T: ?Sized + Send + Sync + 'static,
{
    type Item = Result<Arc<T>, RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let candidate = self.candidates.next()?;
        let item = candidate
            .resolve(self.key)
            .and_then(|value| downcast(&value, self.key));
        self.failed = item.is_err();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.candidates.len()))
        }
    }
}

impl<T> FusedIterator for MatchesIter<'_, T> where T: ?Sized + Send + Sync + 'static {}
