//! # Example: traced_pool
//!
//! End-to-end tour of the instrumentation: wrap a pool once, submit work
//! under an active trace context, and inspect the spans the tasks produced.
//!
//! Demonstrates how to:
//! - Wire a [`TraceProvider`] and an [`ExecutorRegistry`].
//! - Wrap a [`TokioExecutor`] with a logical span name.
//! - Submit jobs, calls, and a batch, all carrying the submitter's context.
//!
//! ## Flow
//! ```text
//! registry.wrap_named(pool, "pipeline")
//!     ├─► execute(job)            ─► span "pipeline", parent = submitter
//!     ├─► submit(call)            ─► span "pipeline", value through handle
//!     └─► invoke_all([ok, fail])  ─► two spans, failure recorded on one
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example traced_pool
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskspan::{
    CallFn, CallRef, DefaultSpanNamer, ExecutorRegistry, JobFn, JobRef, RecordingTracer,
    SpanContext, StaticProvider, TaskError, TaskExecutor, TokioExecutor, Tracer,
};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Host wiring: tracer, namer, provider, registry
    let tracer = Arc::new(RecordingTracer::new());
    let provider = StaticProvider::arc(tracer.clone(), Arc::new(DefaultSpanNamer));
    let registry = ExecutorRegistry::new(&provider);

    // 2. Wrap the pool once under the logical name "pipeline"
    let pool = Arc::new(TokioExecutor::with_concurrency(4));
    let traced = registry.wrap_named(&pool, "pipeline");

    // 3. Establish the submitter's context (a server would get this from a request)
    let submitter = SpanContext::new_root();
    tracer.restore(submitter);
    println!("submitting under context {submitter}");

    // 4. Fire-and-forget job
    let job: JobRef = JobFn::arc("warmup", |_ctx: CancellationToken| async {
        Ok::<(), TaskError>(())
    });
    traced.execute(job)?;

    // 5. Value-producing call
    let total = traced.submit(CallFn::arc("sum", |_ctx: CancellationToken| async {
        Ok::<_, TaskError>(1 + 2 + 3)
    }))?;
    println!("sum resolved to {}", total.await?);

    // 6. Batch with one failure; both futures settle, order is preserved
    let ok: CallRef<i32> = CallFn::arc("ok", |_ctx: CancellationToken| async {
        Ok::<_, TaskError>(10)
    });
    let broken: CallRef<i32> = CallFn::arc("broken", |_ctx: CancellationToken| async {
        Err(TaskError::Fail {
            error: "flaky dependency".into(),
        })
    });
    let handles = traced
        .invoke_all(vec![ok, broken], Some(Duration::from_secs(5)))
        .await?;
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(value) => println!("batch[{index}] -> {value}"),
            Err(error) => println!("batch[{index}] -> {error}"),
        }
    }

    // 7. Drain the pool and show what the tracer saw
    traced.shutdown();
    traced.await_termination(Duration::from_secs(5)).await;

    println!("\nrecorded spans:");
    for span in tracer.snapshot() {
        println!(
            "  {} parent={} ended={} failure={:?}",
            span.name, span.parent, span.ended, span.failure
        );
    }
    Ok(())
}
