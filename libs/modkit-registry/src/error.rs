use crate::type_key::TypeKey;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No entry in the resolution chain matches the requested type.
    #[error("no registry entry matches type={type_key}")]
    NotFound { type_key: TypeKey },

    /// A lazy entry's factory failed. Never cached; the next resolution retries.
    #[error("factory failed for registry entry of type={type_key}")]
    Factory {
        type_key: TypeKey,
        #[source]
        source: anyhow::Error,
    },

    #[error("type mismatch in registry for type={type_key}")]
    TypeMismatch { type_key: TypeKey },
}

impl RegistryError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_factory(&self) -> bool {
        matches!(self, Self::Factory { .. })
    }
}
