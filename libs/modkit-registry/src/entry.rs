//! Registry entries: one declared type bound to a value or to a factory.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::RegistryError;
use crate::type_key::{Object, TypeKey, TypeToken};

/// Zero-argument, possibly failing producer of a lazy entry's value.
pub type Factory<T> = Arc<dyn Fn() -> anyhow::Result<Arc<T>> + Send + Sync>;

/// Process-unique identity of an entry. Cache slots are keyed by it, since
/// several entries may share a declared type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

impl EntryId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Object-safe view of a typed entry.
pub trait Entry: Send + Sync {
    fn id(&self) -> EntryId;

    fn declared(&self) -> TypeKey;

    /// Covariant match: the declared type is `requested` or one of its subtypes.
    fn matches(&self, requested: TypeKey) -> bool;

    fn is_lazy(&self) -> bool;

    /// The stored value, or a fresh factory invocation for lazy entries.
    /// The result is erased at the declared type.
    fn materialize(&self) -> Result<Object, RegistryError>;

    /// Re-erases a value produced by [`Entry::materialize`] as `requested`.
    fn view(&self, value: &Object, requested: TypeKey) -> Result<Object, RegistryError>;
}

pub enum Payload<T: ?Sized> {
    Eager(Arc<T>),
    Lazy(Factory<T>),
}

pub struct TypedEntry<T: ?Sized> {
    id: EntryId,
    token: TypeToken<T>,
    payload: Payload<T>,
}

impl<T> TypedEntry<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn eager(token: TypeToken<T>, value: Arc<T>) -> Self {
        Self {
            id: EntryId::next(),
            token,
            payload: Payload::Eager(value),
        }
    }

    pub(crate) fn lazy(token: TypeToken<T>, factory: Factory<T>) -> Self {
        Self {
            id: EntryId::next(),
            token,
            payload: Payload::Lazy(factory),
        }
    }
}

impl<T> Entry for TypedEntry<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn id(&self) -> EntryId {
        self.id
    }

    fn declared(&self) -> TypeKey {
        self.token.key()
    }

    fn matches(&self, requested: TypeKey) -> bool {
        self.token.is_subtype_of(requested)
    }

    fn is_lazy(&self) -> bool {
        matches!(self.payload, Payload::Lazy(_))
    }

    fn materialize(&self) -> Result<Object, RegistryError> {
        match &self.payload {
            Payload::Eager(value) => Ok(Arc::new(Arc::clone(value))),
            Payload::Lazy(factory) => {
                let value = factory().map_err(|source| {
                    tracing::debug!(
                        type_key = %self.token.key(),
                        entry = ?self.id,
                        error = %source,
                        "Registry entry factory failed"
                    );
                    RegistryError::Factory {
                        type_key: self.token.key(),
                        source,
                    }
                })?;
                Ok(Arc::new(value))
            }
        }
    }

    fn view(&self, value: &Object, requested: TypeKey) -> Result<Object, RegistryError> {
        let typed = value
            .downcast_ref::<Arc<T>>()
            .ok_or(RegistryError::TypeMismatch {
                type_key: self.token.key(),
            })?;
        self.token
            .view(Arc::clone(typed), requested)
            .ok_or(RegistryError::TypeMismatch {
                type_key: requested,
            })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    trait Shape: Send + Sync {
        fn area(&self) -> u32;
    }

    struct Square(u32);

    impl Shape for Square {
        fn area(&self) -> u32 {
            self.0 * self.0
        }
    }

    fn square_token() -> TypeToken<Square> {
        TypeToken::<Square>::of().extends::<dyn Shape>(|v| v)
    }

    #[test]
    fn entry_ids_are_unique() {
        let a = TypedEntry::eager(TypeToken::<u8>::of(), Arc::new(1));
        let b = TypedEntry::eager(TypeToken::<u8>::of(), Arc::new(1));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn matches_is_covariant() {
        let entry = TypedEntry::eager(square_token(), Arc::new(Square(3)));
        assert!(entry.matches(TypeKey::of::<Square>()));
        assert!(entry.matches(TypeKey::of::<dyn Shape>()));
        assert!(!entry.matches(TypeKey::of::<String>()));
        assert!(!entry.is_lazy());
    }

    #[test]
    fn eager_materialize_returns_stored_value() {
        let square = Arc::new(Square(2));
        let entry = TypedEntry::eager(square_token(), Arc::clone(&square));

        let value = entry.materialize().unwrap();
        let got = value.downcast_ref::<Arc<Square>>().unwrap();
        assert!(Arc::ptr_eq(got, &square));
    }

    #[test]
    fn lazy_materialize_invokes_factory_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory: Factory<Square> = Arc::new(move || -> anyhow::Result<Arc<Square>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Square(4)))
        });
        let entry = TypedEntry::lazy(square_token(), factory);

        assert!(entry.is_lazy());
        entry.materialize().unwrap();
        entry.materialize().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn lazy_failure_is_wrapped_unchanged() {
        let factory: Factory<Square> =
            Arc::new(|| -> anyhow::Result<Arc<Square>> { Err(anyhow::anyhow!("disk on fire")) });
        let entry = TypedEntry::lazy(square_token(), factory);

        match entry.materialize() {
            Err(RegistryError::Factory { type_key, source }) => {
                assert_eq!(type_key, TypeKey::of::<Square>());
                assert_eq!(source.to_string(), "disk on fire");
            }
            _ => panic!("Expected Factory error"),
        }
    }

    #[test]
    fn view_produces_supertype() {
        let entry = TypedEntry::eager(square_token(), Arc::new(Square(5)));
        let value = entry.materialize().unwrap();

        let shape = entry.view(&value, TypeKey::of::<dyn Shape>()).unwrap();
        let shape = shape.downcast_ref::<Arc<dyn Shape>>().unwrap();
        assert_eq!(shape.area(), 25);
    }

    #[test]
    fn view_of_foreign_value_is_type_mismatch() {
        let entry = TypedEntry::eager(square_token(), Arc::new(Square(5)));
        let foreign: Object = Arc::new(Arc::new(7_u32));

        let result = entry.view(&foreign, TypeKey::of::<Square>());
        assert!(matches!(result, Err(RegistryError::TypeMismatch { .. })));
    }
}
