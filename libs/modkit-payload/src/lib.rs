//! Typed payloads for `ModKit` registries.
//!
//! A payload is a byte buffer tagged with an optional media type. Consumers
//! read it as raw bytes, as text decoded with the advertised charset, or
//! stream it into any writer:
//!
//! ```
//! use modkit_payload::{ByteData, TypedData};
//!
//! let data = ByteData::from_text("hello");
//! assert_eq!(data.text(), "hello");
//! assert!(data.content_type().is_some_and(|media| media.is_text()));
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod data;
mod error;
mod media_type;

pub use data::{ByteData, TypedData};
pub use error::PayloadError;
pub use media_type::MediaType;
