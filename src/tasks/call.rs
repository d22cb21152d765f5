//! # Value-producing unit of work.
//!
//! [`Call`] is the value-producing sibling of [`Job`](crate::Job): same
//! shape, but `call` resolves to a `T` delivered through the submission's
//! handle. [`CallFn`] wraps a closure, producing a fresh future per call.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a call producing `T`.
pub type CallRef<T> = Arc<dyn Call<T>>;

/// # Asynchronous, cancelable unit producing a value.
#[async_trait]
pub trait Call<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    /// Returns a stable, human-readable name.
    ///
    /// Defaults to the implementing type's full name; span naming shortens
    /// it for display.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Executes the unit until it produces a value, fails, or is cancelled.
    async fn call(&self, ctx: CancellationToken) -> Result<T, TaskError>;

    /// Whether this unit already carries a captured trace context.
    ///
    /// Batch wrapping leaves units that report `true` untouched, so nothing
    /// is ever wrapped twice.
    fn is_traced(&self) -> bool {
        false
    }
}

/// Function-backed call.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use taskspan::{Call, CallFn, CallRef, TaskError};
///
/// let call: CallRef<u32> = CallFn::arc("answer", |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>(42)
/// });
/// assert_eq!(call.name(), "answer");
/// ```
#[derive(Debug)]
pub struct CallFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> CallFn<F> {
    /// Creates a new function-backed call.
    ///
    /// Prefer [`CallFn::arc`] when you immediately need a [`CallRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the call and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, T> Call<T> for CallFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, ctx: CancellationToken) -> Result<T, TaskError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_fn_produces_value() {
        let call: CallRef<u32> = CallFn::arc("double", |_ctx: CancellationToken| async {
            Ok::<_, TaskError>(21 * 2)
        });

        assert_eq!(call.name(), "double");
        assert_eq!(call.call(CancellationToken::new()).await.unwrap(), 42);
        assert!(!call.is_traced());
    }

    #[tokio::test]
    async fn test_call_fn_propagates_failure() {
        let call: CallRef<u32> = CallFn::arc("broken", |_ctx: CancellationToken| async {
            Err(TaskError::Fail {
                error: "boom".into(),
            })
        });

        let err = call.call(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "task_failed");
    }
}
