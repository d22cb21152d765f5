//! # Fire-and-forget unit of work.
//!
//! This module defines the [`Job`] trait (async, cancelable, no produced
//! value) and a function-backed implementation [`JobFn`]. The common handle
//! type is [`JobRef`], an `Arc<dyn Job>` suitable for sharing with an
//! executor.
//!
//! A job receives a [`CancellationToken`] and should periodically check it to
//! stop cooperatively during shutdown.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a job.
pub type JobRef = Arc<dyn Job>;

/// # Asynchronous, cancelable unit with no produced value.
///
/// A `Job` has a human-readable [`name`](Job::name) (defaulting to the
/// implementing type's name) and an async [`run`](Job::run) method that
/// receives a [`CancellationToken`]. Implementors should regularly check
/// cancellation and exit promptly during shutdown.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use taskspan::{Job, TaskError};
///
/// struct Flush;
///
/// #[async_trait]
/// impl Job for Flush {
///     fn name(&self) -> &str { "flush" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Returns a stable, human-readable name.
    ///
    /// Defaults to the implementing type's full name; span naming shortens
    /// it for display.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Executes the unit until completion or cancellation.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;

    /// Whether this unit already carries a captured trace context.
    ///
    /// Batch wrapping leaves units that report `true` untouched, so nothing
    /// is ever wrapped twice.
    fn is_traced(&self) -> bool {
        false
    }
}

/// Function-backed job.
///
/// Wraps a closure that *creates* a new future per run, so there is no
/// shared mutable state between executions. If shared state is needed, move
/// an `Arc<...>` into the closure explicitly.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use taskspan::{Job, JobFn, JobRef, TaskError};
///
/// let job: JobRef = JobFn::arc("hello", |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>(())
/// });
/// assert_eq!(job.name(), "hello");
/// ```
#[derive(Debug)]
pub struct JobFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new function-backed job.
    ///
    /// Prefer [`JobFn::arc`] when you immediately need a [`JobRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the job and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Job for JobFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
