//! Typed configuration sections bound into registries.
//!
//! Configuration objects are the most common thing components look up, so the
//! builder can deserialize a `figment` section and register it under its Rust
//! type. Two loading flavours are provided:
//!
//! 1. **Strict** (`section_required`, `add_config`, `add_config_lazy`): the
//!    section must be present and valid.
//! 2. **Lenient** (`section_or_default`, `add_config_or_default`): a missing
//!    section falls back to `T::default()`; a malformed one is still an error.

use std::sync::Arc;

use figment::Figment;
use serde::de::DeserializeOwned;

use crate::builder::RegistryBuilder;
use crate::type_key::TypeToken;

/// Configuration error for typed section binding.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing config section '{section}'")]
    MissingSection { section: String },
    #[error("invalid config section '{section}': {source}")]
    InvalidSection {
        section: String,
        #[source]
        source: Box<figment::Error>,
    },
}

/// Strict loader: the section must exist and deserialize into `T`.
///
/// # Errors
/// Returns `ConfigError::MissingSection` if `section` is absent and
/// `ConfigError::InvalidSection` if it cannot be deserialized.
pub fn section_required<T: DeserializeOwned>(
    figment: &Figment,
    section: &str,
) -> Result<T, ConfigError> {
    if !figment.contains(section) {
        return Err(ConfigError::MissingSection {
            section: section.to_owned(),
        });
    }
    extract(figment, section)
}

/// Lenient loader: a missing section yields `T::default()`.
///
/// # Errors
/// Returns `ConfigError::InvalidSection` if the section exists but cannot be deserialized.
pub fn section_or_default<T: DeserializeOwned + Default>(
    figment: &Figment,
    section: &str,
) -> Result<T, ConfigError> {
    if !figment.contains(section) {
        return Ok(T::default());
    }
    extract(figment, section)
}

fn extract<T: DeserializeOwned>(figment: &Figment, section: &str) -> Result<T, ConfigError> {
    figment
        .extract_inner(section)
        .map_err(|e| ConfigError::InvalidSection {
            section: section.to_owned(),
            source: Box::new(e),
        })
}

impl RegistryBuilder {
    /// Deserializes `section` now and registers it as an eager entry at `T`.
    ///
    /// # Errors
    /// Returns `ConfigError` if the section is missing or invalid.
    pub fn add_config<T>(&mut self, figment: &Figment, section: &str) -> Result<&mut Self, ConfigError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let config: T = section_required(figment, section)?;
        Ok(self.add(config))
    }

    /// Like [`RegistryBuilder::add_config`], but registers `T::default()` when
    /// the section is missing.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidSection` if the section exists but is invalid.
    pub fn add_config_or_default<T>(
        &mut self,
        figment: &Figment,
        section: &str,
    ) -> Result<&mut Self, ConfigError>
    where
        T: DeserializeOwned + Default + Send + Sync + 'static,
    {
        let config: T = section_or_default(figment, section)?;
        Ok(self.add(config))
    }

    /// Registers a lazy entry that deserializes `section` on first resolution.
    ///
    /// A missing or invalid section surfaces as `RegistryError::Factory` wrapping
    /// the `ConfigError`, and is retried on the next resolution.
    pub fn add_config_lazy<T>(&mut self, figment: Figment, section: impl Into<String>) -> &mut Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let section = section.into();
        self.add_lazy(TypeToken::<T>::of(), move || {
            let config: T = section_required(&figment, &section)?;
            Ok(Arc::new(config))
        })
    }
}
