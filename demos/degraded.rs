//! # Example: degraded
//!
//! Shows the silent fallback: while the provider is usable, submitted work
//! is traced; once the provider starts closing, the same decorator delegates
//! units untouched and no spans appear. Nothing fails and nothing is logged —
//! tracing is strictly best-effort.
//!
//! ## Flow
//! ```text
//! provider open    ─► submit ─► span recorded
//! provider.close()
//! provider closing ─► submit ─► no span, task still runs
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example degraded
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskspan::{
    CallFn, DefaultSpanNamer, ExecutorRegistry, RecordingTracer, StaticProvider, TaskError,
    TaskExecutor, TokioExecutor,
};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Wire tracing and wrap a pool
    let tracer = Arc::new(RecordingTracer::new());
    let provider = StaticProvider::arc(tracer.clone(), Arc::new(DefaultSpanNamer));
    let registry = ExecutorRegistry::new(&provider);
    let pool = Arc::new(TokioExecutor::new());
    let traced = registry.wrap(&pool);

    // 2. Normal operation: this call is traced
    let early = traced.submit(CallFn::arc("early", |_ctx: CancellationToken| async {
        Ok::<_, TaskError>("traced")
    }))?;
    println!("early -> {}", early.await?);

    // 3. The host begins tearing down its wiring
    provider.close();

    // 4. Same decorator, same API; the unit now runs undecorated
    let late = traced.submit(CallFn::arc("late", |_ctx: CancellationToken| async {
        Ok::<_, TaskError>("untraced")
    }))?;
    println!("late  -> {}", late.await?);

    traced.shutdown();
    traced.await_termination(Duration::from_secs(1)).await;

    // 5. Only the first unit left a span behind
    let spans = tracer.snapshot();
    println!("spans recorded: {}", spans.len());
    for span in &spans {
        println!("  {} ended={}", span.name, span.ended);
    }
    Ok(())
}
