//! Continuation-style result sinks.
//!
//! A [`Fulfiller`] receives exactly one outcome of an operation, either a value or
//! an error. [`promise`] runs a [`Fulfillment`] against a channel-backed
//! fulfiller and returns a [`Promise`] that resolves to that outcome.
//!
//! ```ignore
//! let value = promise(|sink: Arc<dyn Fulfiller<u32>>| -> anyhow::Result<()> {
//!     tokio::spawn(async move { sink.success(42) });
//!     Ok(())
//! })
//! .await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod fulfiller;
mod promise;

pub use fulfiller::{ChannelFulfiller, Fulfiller};
pub use promise::{Fulfillment, Promise, PromiseError, promise};
