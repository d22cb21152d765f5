//! # The task-executor contract.
//!
//! Everything an executor owes its callers, in one trait: submission in both
//! unit shapes, batch operations, and lifecycle control. The tracing
//! decorator implements this same trait over any delegate, so instrumented
//! and plain executors are interchangeable at every call site.
//!
//! ## Rules
//! - Submission methods never block; they schedule and return a handle.
//! - `invoke_all` / `invoke_any` are the only waiting submissions, and their
//!   blocking (and timeout) behavior belongs to the implementation.
//! - Lifecycle methods report and control the executor itself and never touch
//!   task semantics.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecutorError;
use crate::tasks::{CallRef, JobRef};

use super::handle::TaskHandle;

/// Generic task executor: schedules units of work and controls its own
/// lifecycle.
///
/// The trait has generic submission methods and is therefore used through
/// concrete types (or wrappers generic over the delegate), not as a trait
/// object.
#[async_trait]
pub trait TaskExecutor: Send + Sync + 'static {
    /// Schedules a fire-and-forget job. The job's outcome is discarded.
    fn execute(&self, job: JobRef) -> Result<(), ExecutorError>;

    /// Schedules a value-producing call. The handle resolves to the call's
    /// result.
    fn submit<T>(&self, call: CallRef<T>) -> Result<TaskHandle<T>, ExecutorError>
    where
        T: Send + 'static;

    /// Schedules a job. The handle resolves to `Ok(())` on success or the
    /// job's error.
    fn submit_job(&self, job: JobRef) -> Result<TaskHandle<()>, ExecutorError>;

    /// Schedules a job with a preset success value. The handle resolves to
    /// `result` when the job succeeds, or to the job's error.
    fn submit_job_with<T>(&self, job: JobRef, result: T) -> Result<TaskHandle<T>, ExecutorError>
    where
        T: Clone + Send + Sync + 'static;

    /// Schedules every call in the batch and waits until all of them have
    /// settled, bounded by `timeout` if given.
    ///
    /// Returns one handle per input call, in input order, each already
    /// settled. When the timeout elapses first, unfinished calls are
    /// cancelled and their handles resolve to [`TaskError::Canceled`].
    ///
    /// [`TaskError::Canceled`]: crate::TaskError::Canceled
    async fn invoke_all<T>(
        &self,
        calls: Vec<CallRef<T>>,
        timeout: Option<Duration>,
    ) -> Result<Vec<TaskHandle<T>>, ExecutorError>
    where
        T: Send + 'static;

    /// Schedules every call in the batch and returns the first successful
    /// result, cancelling the rest.
    ///
    /// Fails with [`ExecutorError::AllFailed`] when every call fails, with
    /// [`ExecutorError::Timeout`] when `timeout` elapses first, and with
    /// [`ExecutorError::EmptyBatch`] for an empty input.
    async fn invoke_any<T>(
        &self,
        calls: Vec<CallRef<T>>,
        timeout: Option<Duration>,
    ) -> Result<T, ExecutorError>
    where
        T: Send + 'static;

    /// Stops accepting new work. Already-accepted units still run.
    fn shutdown(&self);

    /// Stops accepting new work, cancels running units, and returns the
    /// units that were accepted but never started.
    fn shutdown_now(&self) -> Vec<JobRef>;

    /// True once [`shutdown`](TaskExecutor::shutdown) or
    /// [`shutdown_now`](TaskExecutor::shutdown_now) has been called.
    fn is_shutdown(&self) -> bool;

    /// True once the executor is shut down and every accepted unit has
    /// settled.
    fn is_terminated(&self) -> bool;

    /// Waits up to `timeout` for termination. Returns whether the executor
    /// terminated within the budget.
    async fn await_termination(&self, timeout: Duration) -> bool;
}
