//! # Handle to a scheduled unit of work.
//!
//! [`TaskHandle`] is the future a submission returns: awaiting it yields the
//! unit's result, and [`TaskHandle::cancel`] requests cancellation of the
//! unit it tracks. The handle pairs a result channel with the unit's own
//! cancellation token, the same pairing the executor keeps internally.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Future resolving to the result of a scheduled unit.
///
/// Dropping the handle does not cancel the unit; it keeps running detached.
/// If the executor abandons the unit without a result (its side of the
/// channel is dropped), the handle resolves to [`TaskError::Canceled`].
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T, TaskError>>,
    cancel: CancellationToken,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(
        rx: oneshot::Receiver<Result<T, TaskError>>,
        cancel: CancellationToken,
    ) -> Self {
        Self { rx, cancel }
    }

    /// Requests cancellation of the unit this handle tracks.
    ///
    /// A unit that has not started yet will never start; a running unit is
    /// cancelled per the executor's semantics. Either way the handle
    /// resolves to [`TaskError::Canceled`] unless the unit already settled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_closed)) => Poll::Ready(Err(TaskError::Canceled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_to_sent_result() {
        let (tx, rx) = oneshot::channel();
        let handle: TaskHandle<u32> = TaskHandle::new(rx, CancellationToken::new());

        tx.send(Ok(7)).unwrap();
        assert_eq!(handle.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_dropped_producer_resolves_to_canceled() {
        let (tx, rx) = oneshot::channel::<Result<u32, TaskError>>();
        let handle = TaskHandle::new(rx, CancellationToken::new());

        drop(tx);
        assert_eq!(handle.await.unwrap_err(), TaskError::Canceled);
    }

    #[tokio::test]
    async fn test_cancel_fires_token() {
        let (_tx, rx) = oneshot::channel::<Result<(), TaskError>>();
        let token = CancellationToken::new();
        let handle = TaskHandle::new(rx, token.clone());

        handle.cancel();
        assert!(token.is_cancelled());
    }
}
