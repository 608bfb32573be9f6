use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::fulfiller::{ChannelFulfiller, Fulfiller};

#[derive(Debug, thiserror::Error)]
pub enum PromiseError {
    /// Every fulfiller handle was dropped without delivering an outcome.
    #[error("fulfiller dropped without delivering an outcome")]
    Abandoned,
}

/// Body of an operation that reports its outcome through a [`Fulfiller`].
///
/// The fulfiller may be completed before `execute` returns or handed to other
/// tasks and completed later. An `Err` returned from `execute` is delivered to
/// the fulfiller unless it was already completed.
pub trait Fulfillment<T>: Send {
    /// # Errors
    /// Any error raised while starting the operation.
    fn execute(self, fulfiller: Arc<dyn Fulfiller<T>>) -> anyhow::Result<()>;
}

impl<T, F> Fulfillment<T> for F
where
    F: FnOnce(Arc<dyn Fulfiller<T>>) -> anyhow::Result<()> + Send,
{
    fn execute(self, fulfiller: Arc<dyn Fulfiller<T>>) -> anyhow::Result<()> {
        self(fulfiller)
    }
}

/// Future resolving to the outcome delivered to its [`ChannelFulfiller`].
#[must_use = "a promise does nothing unless awaited"]
pub struct Promise<T> {
    rx: oneshot::Receiver<anyhow::Result<T>>,
}

impl<T> Promise<T> {
    pub(crate) fn new(rx: oneshot::Receiver<anyhow::Result<T>>) -> Self {
        Self { rx }
    }
}

impl<T> Future for Promise<T> {
    type Output = anyhow::Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(PromiseError::Abandoned.into())),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Runs `fulfillment` against a fresh channel-backed fulfiller.
pub fn promise<T, F>(fulfillment: F) -> Promise<T>
where
    T: Send + 'static,
    F: Fulfillment<T>,
{
    let (fulfiller, promise) = ChannelFulfiller::new();
    let fulfiller = Arc::new(fulfiller);
    let sink: Arc<dyn Fulfiller<T>> = fulfiller.clone();

    if let Err(error) = fulfillment.execute(sink) {
        if fulfiller.is_completed() {
            tracing::warn!(error = %error, "Fulfillment failed after delivering its outcome");
        } else {
            fulfiller.error(error);
        }
    }
    promise
}
