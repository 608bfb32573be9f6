use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::promise::Promise;

/// Sink for the single outcome of an operation.
///
/// Implementations accept only the first completion; later calls are ignored.
pub trait Fulfiller<T>: Send + Sync {
    fn success(&self, value: T);

    fn error(&self, error: anyhow::Error);
}

/// Fulfiller backed by a oneshot channel; the paired [`Promise`] receives the outcome.
pub struct ChannelFulfiller<T> {
    tx: Mutex<Option<oneshot::Sender<anyhow::Result<T>>>>,
}

impl<T: Send> ChannelFulfiller<T> {
    pub fn new() -> (Self, Promise<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            Promise::new(rx),
        )
    }

    /// Returns `true` once a success or an error has been delivered.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.tx.lock().is_none()
    }

    fn complete(&self, outcome: anyhow::Result<T>) {
        let Some(tx) = self.tx.lock().take() else {
            tracing::warn!(
                success = outcome.is_ok(),
                "Fulfiller already completed; dropping outcome"
            );
            return;
        };
        if tx.send(outcome).is_err() {
            tracing::debug!("Promise dropped before its outcome was delivered");
        }
    }
}

impl<T: Send> Fulfiller<T> for ChannelFulfiller<T> {
    fn success(&self, value: T) {
        self.complete(Ok(value));
    }

    fn error(&self, error: anyhow::Error) {
        self.complete(Err(error));
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_reaches_promise() {
        let (fulfiller, promise) = ChannelFulfiller::new();
        fulfiller.success("done");

        assert!(fulfiller.is_completed());
        assert_eq!(promise.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn error_reaches_promise() {
        let (fulfiller, promise) = ChannelFulfiller::<u8>::new();
        fulfiller.error(anyhow::anyhow!("boom"));

        assert_eq!(promise.await.unwrap_err().to_string(), "boom");
    }

    #[tokio::test]
    async fn only_first_completion_counts() {
        let (fulfiller, promise) = ChannelFulfiller::new();
        fulfiller.success(1);
        fulfiller.success(2);
        fulfiller.error(anyhow::anyhow!("late"));

        assert_eq!(promise.await.unwrap(), 1);
    }

    #[test]
    fn completing_after_promise_dropped_is_harmless() {
        let (fulfiller, promise) = ChannelFulfiller::new();
        drop(promise);
        fulfiller.success(3);
        assert!(fulfiller.is_completed());
    }
}
