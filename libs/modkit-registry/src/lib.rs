//! Type-directed object registry.
//!
//! Components publish shared collaborators (configuration objects, services,
//! clients) into a [`Registry`] keyed by declared type, and other components
//! resolve them by type without explicit wiring.
//!
//! ## Architecture
//!
//! - [`RegistryBuilder`]: mutable accumulator; `build()` snapshots it.
//! - [`LookupEngine`]: immutable entry sequence and the covariant matching rules.
//! - [`CachingRegistry`]: memoizes lazy entries, one lock per entry.
//! - [`HierarchicalRegistry`]: child-before-parent lookup chain.
//! - [`Registry`]: typed handle; every layer above implements [`Lookup`].
//!
//! ## Resolution rules
//!
//! - `get` returns the most recently added matching entry and falls back to the
//!   parent only when the child has no match.
//! - `get_all` yields matches oldest first, child matches before parent matches.
//! - An entry matches a request for `S` when its declared type is `S` or
//!   declares `S` as a supertype through its [`TypeToken`].
//! - Lazy factories run at most once per successful materialization; failures
//!   are returned to the caller and retried on the next resolution.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod builder;
mod caching;
pub mod config;
mod entry;
mod error;
mod hierarchy;
mod lookup;
mod registry;
mod type_key;

pub use builder::RegistryBuilder;
pub use caching::CachingRegistry;
pub use config::ConfigError;
pub use entry::{EntryId, Factory};
pub use error::RegistryError;
pub use hierarchy::HierarchicalRegistry;
pub use lookup::{Candidate, Lookup, LookupEngine};
pub use registry::{Matches, MatchesIter, Registry};
pub use type_key::{TypeKey, TypeToken};
