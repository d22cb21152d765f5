//! # Tokio-backed executor.
//!
//! [`TokioExecutor`] runs every accepted unit as a tokio task, with an
//! optional global concurrency cap and full lifecycle control. It is the
//! in-tree delegate for demos and tests; any component implementing
//! [`TaskExecutor`] can stand in for it.
//!
//! ## Unit lifecycle
//! ```text
//! submit ──► pending map (id → job view)          intake closed? → Rejected
//!              │
//!              ├─► acquire permit (cancellable)    ── cancelled → Canceled
//!              ├─► claim: remove own id from pending
//!              │     └─ already drained by shutdown_now → never starts
//!              ├─► run body (panics contained)     ── cancelled → Canceled
//!              └─► send result to handle, settle accounting
//! ```
//!
//! ## Rules
//! - A unit is *started* once it claims its pending entry; `shutdown_now`
//!   returns exactly the units that never claimed theirs, in submission
//!   order, and none of them will run afterwards.
//! - `shutdown` closes intake only; accepted units still run to completion.
//! - Accounting is a single watch counter: accepted increments, settled
//!   decrements; termination is "closed and counter at zero".

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::sync::{oneshot, watch, Semaphore};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::{ExecutorError, TaskError};
use crate::tasks::{Call, CallRef, Job, JobRef};

use super::handle::TaskHandle;
use super::task_executor::TaskExecutor;

/// Executor scheduling units onto the tokio runtime.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use taskspan::{CallFn, TaskError, TaskExecutor, TokioExecutor};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = TokioExecutor::new();
///
///     let answer = pool.submit(CallFn::arc("answer", |_ctx: CancellationToken| async {
///         Ok::<_, TaskError>(42)
///     }))?;
///     assert_eq!(answer.await?, 42);
///
///     pool.shutdown();
///     assert!(pool.await_termination(Duration::from_secs(1)).await);
///     Ok(())
/// }
/// ```
pub struct TokioExecutor {
    inner: Arc<Inner>,
}

struct Inner {
    /// Next unit id (monotonic).
    next_id: AtomicU64,
    /// Accepted units that have not started, in submission order.
    pending: Mutex<BTreeMap<u64, JobRef>>,
    /// Set once intake stops.
    closed: AtomicBool,
    /// Cancels queued and running units on `shutdown_now`.
    hard_cancel: CancellationToken,
    /// Optional global concurrency cap.
    permits: Option<Arc<Semaphore>>,
    /// Count of accepted-but-unsettled units; drives termination waits.
    active: watch::Sender<usize>,
}

impl Inner {
    fn pending_take(&self, id: u64) -> Option<JobRef> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    fn settle(&self) {
        self.active.send_modify(|n| *n = n.saturating_sub(1));
    }

    /// Runs one accepted unit: permit, claim, body. Every exit settles the
    /// unit's handle with a result.
    async fn run_unit<T>(
        &self,
        id: u64,
        cancel: CancellationToken,
        call: CallRef<T>,
    ) -> Result<T, TaskError>
    where
        T: Send + 'static,
    {
        let _permit = match &self.permits {
            Some(sem) => {
                tokio::select! {
                    permit = Arc::clone(sem).acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_closed) => {
                            self.pending_take(id);
                            return Err(TaskError::Canceled);
                        }
                    },
                    _ = cancel.cancelled() => {
                        self.pending_take(id);
                        return Err(TaskError::Canceled);
                    }
                    _ = self.hard_cancel.cancelled() => {
                        self.pending_take(id);
                        return Err(TaskError::Canceled);
                    }
                }
            }
            None => None,
        };

        // At-most-once start: shutdown_now may have drained this unit while
        // it waited for a permit.
        if self.pending_take(id).is_none() {
            return Err(TaskError::Canceled);
        }

        let body = std::panic::AssertUnwindSafe(call.call(cancel.clone())).catch_unwind();
        tokio::select! {
            result = body => match result {
                Ok(result) => result,
                Err(panic) => Err(TaskError::Panicked { info: panic_info(&panic) }),
            },
            _ = cancel.cancelled() => Err(TaskError::Canceled),
            _ = self.hard_cancel.cancelled() => Err(TaskError::Canceled),
        }
    }
}

impl TokioExecutor {
    /// Creates an executor without a concurrency cap.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates an executor running at most `limit` units at once.
    ///
    /// `limit = 0` means unlimited, as does [`TokioExecutor::new`].
    pub fn with_concurrency(limit: usize) -> Self {
        Self::build(if limit == 0 { None } else { Some(limit) })
    }

    fn build(limit: Option<usize>) -> Self {
        let (active, _) = watch::channel(0usize);
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(0),
                pending: Mutex::new(BTreeMap::new()),
                closed: AtomicBool::new(false),
                hard_cancel: CancellationToken::new(),
                permits: limit.map(|n| Arc::new(Semaphore::new(n))),
                active,
            }),
        }
    }

    /// Accepts one unit: registers its job view in the pending map, bumps
    /// the accounting counter, and spawns its runner.
    fn spawn_with<T>(
        &self,
        call: CallRef<T>,
        as_job: JobRef,
        cancel: CancellationToken,
    ) -> Result<(TaskHandle<T>, JoinHandle<()>), ExecutorError>
    where
        T: Send + 'static,
    {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(ExecutorError::Rejected);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, as_job);
        self.inner.active.send_modify(|n| *n += 1);

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            let result = inner.run_unit(id, token, call).await;
            let _ = tx.send(result);
            inner.settle();
        });

        Ok((TaskHandle::new(rx, cancel), join))
    }
}

impl Default for TokioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskExecutor for TokioExecutor {
    fn execute(&self, job: JobRef) -> Result<(), ExecutorError> {
        let call: CallRef<()> = Arc::new(JobCall {
            job: Arc::clone(&job),
        });
        let (_handle, _join) = self.spawn_with(call, job, CancellationToken::new())?;
        Ok(())
    }

    fn submit<T>(&self, call: CallRef<T>) -> Result<TaskHandle<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        let as_job: JobRef = Arc::new(CallJob {
            call: Arc::clone(&call),
        });
        self.spawn_with(call, as_job, CancellationToken::new())
            .map(|(handle, _join)| handle)
    }

    fn submit_job(&self, job: JobRef) -> Result<TaskHandle<()>, ExecutorError> {
        let call: CallRef<()> = Arc::new(JobCall {
            job: Arc::clone(&job),
        });
        self.spawn_with(call, job, CancellationToken::new())
            .map(|(handle, _join)| handle)
    }

    fn submit_job_with<T>(&self, job: JobRef, result: T) -> Result<TaskHandle<T>, ExecutorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let call: CallRef<T> = Arc::new(JobWithValue {
            job: Arc::clone(&job),
            value: result,
        });
        self.spawn_with(call, job, CancellationToken::new())
            .map(|(handle, _join)| handle)
    }

    async fn invoke_all<T>(
        &self,
        calls: Vec<CallRef<T>>,
        timeout: Option<Duration>,
    ) -> Result<Vec<TaskHandle<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        let mut handles = Vec::with_capacity(calls.len());
        let mut runners: FuturesUnordered<JoinHandle<()>> = FuturesUnordered::new();
        for call in calls {
            let as_job: JobRef = Arc::new(CallJob {
                call: Arc::clone(&call),
            });
            let (handle, join) = self.spawn_with(call, as_job, CancellationToken::new())?;
            handles.push(handle);
            runners.push(join);
        }

        let drain = async { while runners.next().await.is_some() {} };
        tokio::pin!(drain);

        match timeout {
            None => drain.await,
            Some(budget) => {
                if time::timeout(budget, &mut drain).await.is_err() {
                    for handle in &handles {
                        handle.cancel();
                    }
                    drain.await;
                }
            }
        }
        Ok(handles)
    }

    async fn invoke_any<T>(
        &self,
        calls: Vec<CallRef<T>>,
        timeout: Option<Duration>,
    ) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        if calls.is_empty() {
            return Err(ExecutorError::EmptyBatch);
        }

        let batch = CancellationToken::new();
        let mut pending: FuturesUnordered<TaskHandle<T>> = FuturesUnordered::new();
        for call in calls {
            let as_job: JobRef = Arc::new(CallJob {
                call: Arc::clone(&call),
            });
            let (handle, _join) = self.spawn_with(call, as_job, batch.child_token())?;
            pending.push(handle);
        }

        let race = async {
            let mut last: Option<TaskError> = None;
            while let Some(result) = pending.next().await {
                match result {
                    Ok(value) => return Ok(value),
                    Err(error) => last = Some(error),
                }
            }
            Err(ExecutorError::AllFailed {
                last: last.unwrap_or(TaskError::Canceled),
            })
        };

        let outcome = match timeout {
            None => race.await,
            Some(budget) => match time::timeout(budget, race).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ExecutorError::Timeout { timeout: budget }),
            },
        };

        batch.cancel();
        outcome
    }

    fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::Release);
        // wake termination waiters even when nothing is in flight
        self.inner.active.send_modify(|_| {});
    }

    fn shutdown_now(&self) -> Vec<JobRef> {
        self.inner.closed.store(true, Ordering::Release);
        let unstarted: Vec<JobRef> = {
            let mut pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *pending).into_values().collect()
        };
        self.inner.hard_cancel.cancel();
        self.inner.active.send_modify(|_| {});
        unstarted
    }

    fn is_shutdown(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    fn is_terminated(&self) -> bool {
        self.is_shutdown() && *self.inner.active.borrow() == 0
    }

    async fn await_termination(&self, timeout: Duration) -> bool {
        let mut active = self.inner.active.subscribe();
        let drained = async {
            loop {
                if self.is_terminated() {
                    break;
                }
                if active.changed().await.is_err() {
                    break;
                }
            }
        };
        time::timeout(timeout, drained).await.is_ok()
    }
}

/// A job viewed as a `Call<()>`.
struct JobCall {
    job: JobRef,
}

#[async_trait]
impl Call<()> for JobCall {
    fn name(&self) -> &str {
        self.job.name()
    }

    async fn call(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        self.job.run(ctx).await
    }

    fn is_traced(&self) -> bool {
        self.job.is_traced()
    }
}

/// A job with a preset success value, viewed as a `Call<T>`.
struct JobWithValue<T> {
    job: JobRef,
    value: T,
}

#[async_trait]
impl<T> Call<T> for JobWithValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.job.name()
    }

    async fn call(&self, ctx: CancellationToken) -> Result<T, TaskError> {
        self.job.run(ctx).await.map(|()| self.value.clone())
    }

    fn is_traced(&self) -> bool {
        self.job.is_traced()
    }
}

/// A call viewed as a job, discarding its value. This is the shape kept in
/// the pending map so `shutdown_now` can hand unstarted units back.
struct CallJob<T>
where
    T: Send + 'static,
{
    call: CallRef<T>,
}

#[async_trait]
impl<T> Job for CallJob<T>
where
    T: Send + 'static,
{
    fn name(&self) -> &str {
        self.call.name()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        self.call.call(ctx).await.map(|_value| ())
    }

    fn is_traced(&self) -> bool {
        self.call.is_traced()
    }
}

fn panic_info(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
