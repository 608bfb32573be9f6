//! Runtime type descriptors used to key registry entries.
//!
//! A [`TypeKey`] identifies a single Rust type. A [`TypeToken`] couples the key of
//! a declared type `T` with the supertypes `T` may be viewed as. Rust has no
//! subtyping between nominal types, so the relation is declared explicitly: each
//! supertype comes with an upcast function, normally the unsizing coercion of
//! `Arc<Impl>` into `Arc<dyn Trait>`.
//!
//! ```ignore
//! trait Greeter: Send + Sync {}
//! struct English;
//! impl Greeter for English {}
//!
//! let token = TypeToken::<English>::of().extends::<dyn Greeter>(|v| v);
//! assert!(token.is_subtype_of(TypeKey::of::<dyn Greeter>()));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Erased registry value. Always holds an `Arc<T>` for some `T: ?Sized`.
pub type Object = Arc<dyn Any + Send + Sync>;

type UpcastFn<T> = Arc<dyn Fn(Arc<T>) -> Object + Send + Sync>;

/// Stable key for a (possibly unsized) type.
///
/// Equality and hashing use the `TypeId`; the type name is kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully-qualified type name, as reported by `std::any::type_name`.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

struct Upcast<T: ?Sized> {
    target: TypeKey,
    cast: UpcastFn<T>,
}

impl<T: ?Sized> Clone for Upcast<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            cast: Arc::clone(&self.cast),
        }
    }
}

/// Declared type of a registry entry together with its supertypes.
///
/// The subtype relation is reflexive (a token always matches its own key) and
/// transitive when supertypes are declared through [`TypeToken::extends_token`].
pub struct TypeToken<T: ?Sized> {
    key: TypeKey,
    supertypes: Vec<Upcast<T>>,
}

impl<T: ?Sized> Clone for TypeToken<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            supertypes: self.supertypes.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for TypeToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeToken")
            .field("key", &self.key)
            .field(
                "supertypes",
                &self.supertypes.iter().map(|u| u.target).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl<T> Default for TypeToken<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::of()
    }
}

impl<T> TypeToken<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    /// Token for `T` with no supertypes besides `T` itself.
    #[must_use]
    pub fn of() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            supertypes: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Declares `S` as a supertype of `T`.
    ///
    /// `cast` is usually `|v| v`, letting the compiler coerce `Arc<T>` into
    /// `Arc<dyn Trait>`. Declaring the same supertype twice keeps the first cast.
    #[must_use]
    pub fn extends<S>(mut self, cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.push(Upcast {
            target: TypeKey::of::<S>(),
            cast: Arc::new(move |value: Arc<T>| -> Object { Arc::new(cast(value)) }),
        });
        self
    }

    /// Declares `S` as a supertype of `T`, inheriting every supertype already
    /// declared on `parent`.
    #[must_use]
    pub fn extends_token<S>(mut self, parent: &TypeToken<S>, cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self = self.extends(cast);
        for inherited in &parent.supertypes {
            let outer = Arc::clone(&inherited.cast);
            self.push(Upcast {
                target: inherited.target,
                cast: Arc::new(move |value: Arc<T>| outer(cast(value))),
            });
        }
        self
    }

    /// Returns `true` when a `T` can be viewed as the type identified by `other`.
    #[must_use]
    pub fn is_subtype_of(&self, other: TypeKey) -> bool {
        self.key == other || self.supertypes.iter().any(|u| u.target == other)
    }

    /// Declared supertypes, excluding `T` itself, in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.supertypes.iter().map(|u| u.target)
    }

    /// Views `value` as `target`, erased. `None` when `target` is not a supertype.
    pub(crate) fn view(&self, value: Arc<T>, target: TypeKey) -> Option<Object> {
        if target == self.key {
            return Some(Arc::new(value));
        }
        self.supertypes
            .iter()
            .find(|u| u.target == target)
            .map(|u| (u.cast)(value))
    }

    fn push(&mut self, upcast: Upcast<T>) {
        if upcast.target == self.key || self.supertypes.iter().any(|u| u.target == upcast.target) {
            return;
        }
        self.supertypes.push(upcast);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    trait Service: Named {
        fn port(&self) -> u16;
    }

    struct Http;

    impl Named for Http {
        fn name(&self) -> &str {
            "http"
        }
    }

    impl Service for Http {
        fn port(&self) -> u16 {
            8080
        }
    }

    #[test]
    fn keys_compare_by_type_identity() {
        assert_eq!(TypeKey::of::<String>(), TypeKey::of::<String>());
        assert_ne!(TypeKey::of::<String>(), TypeKey::of::<str>());
        assert!(TypeKey::of::<dyn Service>().name().contains("Service"));
    }

    #[test]
    fn token_is_reflexive() {
        let token = TypeToken::<Http>::of();
        assert!(token.is_subtype_of(TypeKey::of::<Http>()));
        assert!(!token.is_subtype_of(TypeKey::of::<dyn Service>()));
    }

    #[test]
    fn declared_supertype_matches_and_views() {
        let token = TypeToken::<Http>::of().extends::<dyn Service>(|v| v);
        assert!(token.is_subtype_of(TypeKey::of::<dyn Service>()));

        let view = token
            .view(Arc::new(Http), TypeKey::of::<dyn Service>())
            .unwrap();
        let service = view.downcast_ref::<Arc<dyn Service>>().unwrap();
        assert_eq!(service.port(), 8080);
    }

    #[test]
    fn extends_token_is_transitive() {
        let service = TypeToken::<dyn Service>::of().extends::<dyn Named>(|v| v);
        let http = TypeToken::<Http>::of().extends_token(&service, |v| v);

        assert!(http.is_subtype_of(TypeKey::of::<dyn Service>()));
        assert!(http.is_subtype_of(TypeKey::of::<dyn Named>()));

        let view = http
            .view(Arc::new(Http), TypeKey::of::<dyn Named>())
            .unwrap();
        let named = view.downcast_ref::<Arc<dyn Named>>().unwrap();
        assert_eq!(named.name(), "http");
    }

    #[test]
    fn view_rejects_unrelated_type() {
        let token = TypeToken::<Http>::of().extends::<dyn Service>(|v| v);
        assert!(token.view(Arc::new(Http), TypeKey::of::<String>()).is_none());
    }

    #[test]
    fn duplicate_supertypes_are_collapsed() {
        let token = TypeToken::<Http>::of()
            .extends::<dyn Service>(|v| v)
            .extends::<dyn Service>(|v| v);
        assert_eq!(token.supertypes().count(), 1);
    }
}
