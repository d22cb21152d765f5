//! # Context-capturing task adapters.
//!
//! [`TracedJob`] and [`TracedCall`] wrap a unit of work together with the
//! trace context that was active when the wrapper was built. When the unit
//! eventually runs — on whatever worker the executor picks — the adapter
//! opens a span as a child of that captured context, keeps it active for the
//! duration of the body, records any failure, and closes it with the prior
//! context restored.
//!
//! ## Rules
//! - The span name is the configured name when non-empty, otherwise derived
//!   from the unit's own name via the [`SpanNamer`].
//! - The wrapped unit's outcome is returned unchanged; recording a failure
//!   never replaces it.
//! - Both adapters report [`is_traced`](crate::Job::is_traced) as `true`, so
//!   batch wrapping never stacks a second adapter on top.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::{Call, CallRef, Job, JobRef};
use crate::trace::{SpanContext, SpanNamer, Tracer};

use super::scope::SpanScope;

fn resolve_name(
    configured: Option<&str>,
    namer: &Arc<dyn SpanNamer>,
    unit_name: &str,
) -> String {
    match configured.filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => namer.name_for(unit_name),
    }
}

/// A job carrying the trace context captured when it was wrapped.
pub struct TracedJob {
    inner: JobRef,
    context: SpanContext,
    span_name: Option<Cow<'static, str>>,
    tracer: Arc<dyn Tracer>,
    namer: Arc<dyn SpanNamer>,
}

impl TracedJob {
    /// Wraps `inner`, capturing the tracer's current context.
    pub fn new(
        tracer: Arc<dyn Tracer>,
        namer: Arc<dyn SpanNamer>,
        inner: JobRef,
        span_name: Option<Cow<'static, str>>,
    ) -> Self {
        let context = tracer.current_context();
        Self {
            inner,
            context,
            span_name,
            tracer,
            namer,
        }
    }

    /// Returns the context captured at wrap time.
    pub fn context(&self) -> SpanContext {
        self.context
    }
}

#[async_trait]
impl Job for TracedJob {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        let name = resolve_name(self.span_name.as_deref(), &self.namer, self.inner.name());
        let scope = SpanScope::open(Arc::clone(&self.tracer), &self.context, &name);
        let result = self.inner.run(ctx).await;
        if let Err(error) = &result {
            scope.record_failure(error);
        }
        result
    }

    fn is_traced(&self) -> bool {
        true
    }
}

/// A call carrying the trace context captured when it was wrapped.
pub struct TracedCall<T>
where
    T: Send + 'static,
{
    inner: CallRef<T>,
    context: SpanContext,
    span_name: Option<Cow<'static, str>>,
    tracer: Arc<dyn Tracer>,
    namer: Arc<dyn SpanNamer>,
}

impl<T> TracedCall<T>
where
    T: Send + 'static,
{
    /// Wraps `inner`, capturing the tracer's current context.
    pub fn new(
        tracer: Arc<dyn Tracer>,
        namer: Arc<dyn SpanNamer>,
        inner: CallRef<T>,
        span_name: Option<Cow<'static, str>>,
    ) -> Self {
        let context = tracer.current_context();
        Self {
            inner,
            context,
            span_name,
            tracer,
            namer,
        }
    }

    /// Returns the context captured at wrap time.
    pub fn context(&self) -> SpanContext {
        self.context
    }
}

#[async_trait]
impl<T> Call<T> for TracedCall<T>
where
    T: Send + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn call(&self, ctx: CancellationToken) -> Result<T, TaskError> {
        let name = resolve_name(self.span_name.as_deref(), &self.namer, self.inner.name());
        let scope = SpanScope::open(Arc::clone(&self.tracer), &self.context, &name);
        let result = self.inner.call(ctx).await;
        if let Err(error) = &result {
            scope.record_failure(error);
        }
        result
    }

    fn is_traced(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{CallFn, JobFn};
    use crate::trace::{DefaultSpanNamer, RecordingTracer};
    use futures::FutureExt;

    fn setup() -> (Arc<RecordingTracer>, Arc<dyn SpanNamer>, SpanContext) {
        let tracer = Arc::new(RecordingTracer::new());
        let submitter = SpanContext::new_root();
        tracer.restore(submitter);
        (tracer, Arc::new(DefaultSpanNamer), submitter)
    }

    #[tokio::test]
    async fn test_span_is_child_of_captured_context_and_restored_after() {
        let (tracer, namer, submitter) = setup();
        let probe = Arc::clone(&tracer);
        let job: JobRef = JobFn::arc("hello", move |_ctx: CancellationToken| {
            let probe = Arc::clone(&probe);
            let submitter = submitter;
            async move {
                let active = probe.current_context();
                assert_eq!(active.trace_id(), submitter.trace_id());
                assert_ne!(active, submitter);
                Ok(())
            }
        });

        let traced = TracedJob::new(tracer.clone(), namer, job, None);
        assert_eq!(traced.context(), submitter);
        assert!(traced.is_traced());

        traced.run(CancellationToken::new()).await.unwrap();

        assert_eq!(tracer.current_context(), submitter);
        let spans = tracer.snapshot();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].parent, submitter);
        assert_eq!(spans[0].name, "hello");
        assert!(spans[0].ended);
        assert!(spans[0].failure.is_none());
    }

    #[tokio::test]
    async fn test_failure_recorded_and_propagated_unchanged() {
        let (tracer, namer, submitter) = setup();
        let call: CallRef<u32> = CallFn::arc("broken", |_ctx: CancellationToken| async {
            Err(TaskError::Fail {
                error: "boom".into(),
            })
        });

        let traced = TracedCall::new(tracer.clone(), namer, call, None);
        let err = traced.call(CancellationToken::new()).await.unwrap_err();
        assert_eq!(
            err,
            TaskError::Fail {
                error: "boom".into()
            }
        );

        assert_eq!(tracer.current_context(), submitter);
        let spans = tracer.snapshot();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].ended);
        let failure = spans[0].failure.as_deref();
        assert!(failure.is_some_and(|f| f.contains("boom")));
    }

    #[tokio::test]
    async fn test_configured_name_wins_over_namer() {
        let (tracer, namer, _submitter) = setup();
        let job: JobRef = JobFn::arc("raw-name", |_ctx: CancellationToken| async { Ok(()) });

        let traced = TracedJob::new(tracer.clone(), namer, job, Some("job-A".into()));
        traced.run(CancellationToken::new()).await.unwrap();

        assert_eq!(tracer.snapshot()[0].name, "job-A");
    }

    #[tokio::test]
    async fn test_empty_configured_name_falls_back_to_namer() {
        let (tracer, namer, _submitter) = setup();
        let job: JobRef = JobFn::arc("fallback", |_ctx: CancellationToken| async { Ok(()) });

        let traced = TracedJob::new(tracer.clone(), namer, job, Some("".into()));
        traced.run(CancellationToken::new()).await.unwrap();

        assert_eq!(tracer.snapshot()[0].name, "fallback");
    }

    #[tokio::test]
    async fn test_span_closed_and_context_restored_on_panic() {
        struct Explodes;

        #[async_trait]
        impl Job for Explodes {
            fn name(&self) -> &str {
                "explodes"
            }

            async fn run(&self, _ctx: CancellationToken) -> Result<(), TaskError> {
                panic!("kaboom");
            }
        }

        let (tracer, namer, submitter) = setup();
        let traced = TracedJob::new(tracer.clone(), namer, Arc::new(Explodes), None);
        let outcome = std::panic::AssertUnwindSafe(traced.run(CancellationToken::new()))
            .catch_unwind()
            .await;
        assert!(outcome.is_err());

        assert_eq!(tracer.current_context(), submitter);
        let spans = tracer.snapshot();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].ended);
    }
}
