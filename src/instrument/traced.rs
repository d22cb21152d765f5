//! # The tracing executor decorator.
//!
//! [`TracedExecutor`] implements the full [`TaskExecutor`] contract over a
//! delegate. Every submission runs through one guard-then-wrap helper per
//! unit shape; lifecycle calls pass straight through. The tracer and namer
//! are looked up lazily through the [`TraceProvider`] and memoized, so a
//! decorator built before tracing is wired still picks it up on first use.
//!
//! ## Rules
//! - The decorator owns no threads; the delegate keeps all execution
//!   authority.
//! - When [`context_unusable`] reports `true`, or either capability cannot
//!   be resolved, units are delegated untouched. Silently.
//! - Units already carrying a captured context are never wrapped again.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecutorError;
use crate::executor::{TaskExecutor, TaskHandle};
use crate::tasks::{CallRef, JobRef};
use crate::trace::{context_unusable, SpanNamer, TraceProvider, Tracer};

use super::captured::{TracedCall, TracedJob};

/// Executor decorator that propagates trace context into every unit of work.
///
/// Build one per delegate through an
/// [`ExecutorRegistry`](crate::ExecutorRegistry), which guarantees a single
/// decorator per underlying executor, or directly via [`TracedExecutor::new`]
/// when registry semantics are not needed.
pub struct TracedExecutor<E> {
    delegate: Arc<E>,
    span_name: Option<Cow<'static, str>>,
    provider: Weak<dyn TraceProvider>,
    tracer: OnceLock<Arc<dyn Tracer>>,
    namer: OnceLock<Arc<dyn SpanNamer>>,
}

impl<E> TracedExecutor<E>
where
    E: TaskExecutor,
{
    /// Decorates `delegate` without a configured span name; spans are named
    /// after each unit.
    pub fn new<P>(provider: &Arc<P>, delegate: Arc<E>) -> Self
    where
        P: TraceProvider,
    {
        let provider: Arc<dyn TraceProvider> = provider.clone();
        let provider: Weak<dyn TraceProvider> = Arc::downgrade(&provider);
        Self::from_parts(provider, delegate, None)
    }

    /// Decorates `delegate` with a fixed logical span name used for every
    /// unit it schedules.
    pub fn named<P>(
        provider: &Arc<P>,
        delegate: Arc<E>,
        span_name: impl Into<Cow<'static, str>>,
    ) -> Self
    where
        P: TraceProvider,
    {
        let provider: Arc<dyn TraceProvider> = provider.clone();
        let provider: Weak<dyn TraceProvider> = Arc::downgrade(&provider);
        Self::from_parts(provider, delegate, Some(span_name.into()))
    }

    pub(crate) fn from_parts(
        provider: Weak<dyn TraceProvider>,
        delegate: Arc<E>,
        span_name: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            delegate,
            span_name,
            provider,
            tracer: OnceLock::new(),
            namer: OnceLock::new(),
        }
    }

    /// Returns the decorated delegate.
    pub fn delegate(&self) -> &Arc<E> {
        &self.delegate
    }

    /// Resolves the tracer once and caches it. A concurrent first call may
    /// perform a redundant lookup; the cached value never changes after.
    fn tracer(&self) -> Option<Arc<dyn Tracer>> {
        if let Some(tracer) = self.tracer.get() {
            return Some(Arc::clone(tracer));
        }
        let resolved = self.provider.upgrade()?.tracer()?;
        Some(Arc::clone(self.tracer.get_or_init(|| resolved)))
    }

    /// Resolves the span namer once and caches it, like
    /// [`tracer`](Self::tracer).
    fn namer(&self) -> Option<Arc<dyn SpanNamer>> {
        if let Some(namer) = self.namer.get() {
            return Some(Arc::clone(namer));
        }
        let resolved = self.provider.upgrade()?.span_namer()?;
        Some(Arc::clone(self.namer.get_or_init(|| resolved)))
    }

    /// The single guard for every submission path: both capabilities, or
    /// nothing and the unit runs untouched.
    fn capabilities(&self) -> Option<(Arc<dyn Tracer>, Arc<dyn SpanNamer>)> {
        if context_unusable(&self.provider) {
            return None;
        }
        Some((self.tracer()?, self.namer()?))
    }

    fn wrap_job(&self, job: JobRef) -> JobRef {
        if job.is_traced() {
            return job;
        }
        match self.capabilities() {
            Some((tracer, namer)) => {
                Arc::new(TracedJob::new(tracer, namer, job, self.span_name.clone()))
            }
            None => job,
        }
    }

    fn wrap_call<T>(&self, call: CallRef<T>) -> CallRef<T>
    where
        T: Send + 'static,
    {
        if call.is_traced() {
            return call;
        }
        match self.capabilities() {
            Some((tracer, namer)) => {
                Arc::new(TracedCall::new(tracer, namer, call, self.span_name.clone()))
            }
            None => call,
        }
    }

    fn wrap_batch<T>(&self, calls: Vec<CallRef<T>>) -> Vec<CallRef<T>>
    where
        T: Send + 'static,
    {
        match self.capabilities() {
            Some((tracer, namer)) => calls
                .into_iter()
                .map(|call| {
                    if call.is_traced() {
                        call
                    } else {
                        Arc::new(TracedCall::new(
                            Arc::clone(&tracer),
                            Arc::clone(&namer),
                            call,
                            self.span_name.clone(),
                        )) as CallRef<T>
                    }
                })
                .collect(),
            None => calls,
        }
    }
}

#[async_trait]
impl<E> TaskExecutor for TracedExecutor<E>
where
    E: TaskExecutor,
{
    fn execute(&self, job: JobRef) -> Result<(), ExecutorError> {
        self.delegate.execute(self.wrap_job(job))
    }

    fn submit<T>(&self, call: CallRef<T>) -> Result<TaskHandle<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.delegate.submit(self.wrap_call(call))
    }

    fn submit_job(&self, job: JobRef) -> Result<TaskHandle<()>, ExecutorError> {
        self.delegate.submit_job(self.wrap_job(job))
    }

    fn submit_job_with<T>(&self, job: JobRef, result: T) -> Result<TaskHandle<T>, ExecutorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.delegate.submit_job_with(self.wrap_job(job), result)
    }

    async fn invoke_all<T>(
        &self,
        calls: Vec<CallRef<T>>,
        timeout: Option<Duration>,
    ) -> Result<Vec<TaskHandle<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.delegate
            .invoke_all(self.wrap_batch(calls), timeout)
            .await
    }

    async fn invoke_any<T>(
        &self,
        calls: Vec<CallRef<T>>,
        timeout: Option<Duration>,
    ) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        self.delegate
            .invoke_any(self.wrap_batch(calls), timeout)
            .await
    }

    fn shutdown(&self) {
        self.delegate.shutdown();
    }

    fn shutdown_now(&self) -> Vec<JobRef> {
        self.delegate.shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        self.delegate.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.delegate.is_terminated()
    }

    async fn await_termination(&self, timeout: Duration) -> bool {
        self.delegate.await_termination(timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::executor::TokioExecutor;
    use crate::tasks::{CallFn, JobFn};
    use crate::trace::{DefaultSpanNamer, RecordingTracer, SpanContext, StaticProvider};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    fn setup() -> (Arc<RecordingTracer>, Arc<StaticProvider>, Arc<TokioExecutor>) {
        let tracer = Arc::new(RecordingTracer::new());
        let provider = StaticProvider::arc(tracer.clone(), Arc::new(DefaultSpanNamer));
        (tracer, provider, Arc::new(TokioExecutor::new()))
    }

    #[tokio::test]
    async fn test_named_submission_opens_child_span_and_restores_context() {
        let (tracer, provider, pool) = setup();
        let traced = TracedExecutor::named(&provider, pool, "job-A");

        let submitter = SpanContext::new_root();
        tracer.restore(submitter);

        let job: JobRef = JobFn::arc("command", |_ctx: CancellationToken| async { Ok(()) });
        traced.submit_job(job).unwrap().await.unwrap();

        let spans = tracer.snapshot();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "job-A");
        assert_eq!(spans[0].parent, submitter);
        assert!(spans[0].ended);
        assert_eq!(tracer.current_context(), submitter);
    }

    #[tokio::test]
    async fn test_failure_surfaces_unchanged_while_span_records_it() {
        let (tracer, provider, pool) = setup();
        let traced = TracedExecutor::new(&provider, pool);

        let call: CallRef<u32> = CallFn::arc("broken", |_ctx: CancellationToken| async {
            Err(TaskError::Fail {
                error: "boom".into(),
            })
        });

        let err = traced.submit(call).unwrap().await.unwrap_err();
        assert_eq!(
            err,
            TaskError::Fail {
                error: "boom".into()
            }
        );

        let spans = tracer.snapshot();
        assert_eq!(spans.len(), 1);
        let failure = spans[0].failure.as_deref();
        assert!(failure.is_some_and(|f| f.contains("boom")));
    }

    #[tokio::test]
    async fn test_closing_provider_degrades_to_untraced_execution() {
        let (tracer, provider, pool) = setup();
        let traced = TracedExecutor::new(&provider, pool);

        provider.close();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let job: JobRef = JobFn::arc("plain", move |_ctx: CancellationToken| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });

        traced.submit_job(job).unwrap().await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
        assert!(tracer.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_provider_degrades_to_untraced_execution() {
        let (tracer, provider, pool) = setup();
        let traced = TracedExecutor::new(&provider, pool);
        drop(provider);

        let call: CallRef<u32> =
            CallFn::arc("plain", |_ctx: CancellationToken| async { Ok::<_, TaskError>(3) });
        assert_eq!(traced.submit(call).unwrap().await.unwrap(), 3);
        assert!(tracer.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_batch_skips_already_traced_entries() {
        let (tracer, provider, pool) = setup();
        let traced = TracedExecutor::new(&provider, pool);

        let plain: CallRef<u32> =
            CallFn::arc("plain", |_ctx: CancellationToken| async { Ok::<_, TaskError>(1) });
        let pre_wrapped: CallRef<u32> = Arc::new(TracedCall::new(
            tracer.clone(),
            Arc::new(DefaultSpanNamer),
            CallFn::arc("wrapped", |_ctx: CancellationToken| async {
                Ok::<_, TaskError>(2)
            }),
            None,
        ));

        let handles = traced
            .invoke_all(vec![pre_wrapped, plain], None)
            .await
            .unwrap();
        let mut handles = handles.into_iter();
        assert_eq!(handles.next().unwrap().await.unwrap(), 2);
        assert_eq!(handles.next().unwrap().await.unwrap(), 1);

        // one span per unit; the pre-wrapped entry was not wrapped again
        assert_eq!(tracer.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_invoke_any_wraps_batch_and_returns_first_success() {
        let (tracer, provider, pool) = setup();
        let traced = TracedExecutor::new(&provider, pool);

        let fails: CallRef<u32> = CallFn::arc("fails", |_ctx: CancellationToken| async {
            Err(TaskError::Fail {
                error: "nope".into(),
            })
        });
        let wins: CallRef<u32> =
            CallFn::arc("wins", |_ctx: CancellationToken| async { Ok::<_, TaskError>(9) });

        let value = traced.invoke_any(vec![fails, wins], None).await.unwrap();
        assert_eq!(value, 9);
        assert_eq!(tracer.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_unit_cancelled_before_start_opens_no_span() {
        let (tracer, provider, _pool) = setup();
        let pool = Arc::new(TokioExecutor::with_concurrency(1));
        let traced = TracedExecutor::new(&provider, pool);

        // occupies the single permit until cancelled
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let started_tx = std::sync::Mutex::new(Some(started_tx));
        let blocker: CallRef<u32> = CallFn::arc("blocker", move |ctx: CancellationToken| {
            let started = started_tx.lock().unwrap().take();
            async move {
                if let Some(tx) = started {
                    let _ = tx.send(());
                }
                ctx.cancelled().await;
                Err(TaskError::Canceled)
            }
        });
        let blocked = traced.submit(blocker).unwrap();
        started_rx.await.unwrap();

        // queued behind the blocker; cancelled before it ever gets a permit
        let queued = traced
            .submit(CallFn::arc("queued", |_ctx: CancellationToken| async {
                Ok::<_, TaskError>(1)
            }))
            .unwrap();
        queued.cancel();
        assert_eq!(queued.await.unwrap_err(), TaskError::Canceled);

        blocked.cancel();
        let _ = blocked.await;

        // only the blocker's span was opened; the queued unit never started
        assert_eq!(tracer.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_lifecycle_passes_through_to_delegate() {
        let (_tracer, provider, pool) = setup();
        let traced = TracedExecutor::new(&provider, Arc::clone(&pool));

        assert!(!traced.is_shutdown());
        traced.shutdown();
        assert!(pool.is_shutdown());
        assert!(traced.is_shutdown());
        assert!(traced.await_termination(Duration::from_secs(1)).await);
        assert!(traced.is_terminated());
        assert!(traced.shutdown_now().is_empty());
    }

    #[tokio::test]
    async fn test_capabilities_resolved_once() {
        struct CountingProvider {
            inner: Arc<RecordingTracer>,
            lookups: AtomicUsize,
        }

        impl TraceProvider for CountingProvider {
            fn tracer(&self) -> Option<Arc<dyn Tracer>> {
                self.lookups.fetch_add(1, Ordering::SeqCst);
                Some(self.inner.clone())
            }

            fn span_namer(&self) -> Option<Arc<dyn SpanNamer>> {
                Some(Arc::new(DefaultSpanNamer))
            }
        }

        let provider = Arc::new(CountingProvider {
            inner: Arc::new(RecordingTracer::new()),
            lookups: AtomicUsize::new(0),
        });
        let traced = TracedExecutor::new(&provider, Arc::new(TokioExecutor::new()));

        for _ in 0..3 {
            let job: JobRef = JobFn::arc("tick", |_ctx: CancellationToken| async { Ok(()) });
            traced.submit_job(job).unwrap().await.unwrap();
        }

        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
    }
}
