//! # taskspan
//!
//! **Taskspan** propagates distributed-tracing context across task-executor
//! boundaries.
//!
//! When work is handed to an executor, the causal link between the submitting
//! operation and the executed task is lost unless the trace context active at
//! submission time travels with the unit. Taskspan decorates an executor so
//! that every submitted unit captures that context, and — on whichever worker
//! eventually runs it — opens a span as a child of it, runs the body, records
//! any failure, and restores the previous context before the worker moves on.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     caller                         host wiring
//!        │                                │
//!        ▼                                ▼
//! ┌──────────────────┐    ┌──────────────────────────────┐
//! │ ExecutorRegistry │◄───│ TraceProvider                │
//! │  wrap(pool) once │    │  (Tracer + SpanNamer lookup) │
//! └────────┬─────────┘    └──────────────────────────────┘
//!          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │ TracedExecutor (one per underlying executor)         │
//! │  - per submission: usable context? wrap : pass       │
//! │  - lifecycle calls: pass through untouched           │
//! └────────┬─────────────────────────────────────────────┘
//!          ▼
//!   TracedJob / TracedCall (context captured at submission)
//!          │
//!          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │ underlying executor (e.g. TokioExecutor)             │
//! │  worker picks up the unit:                           │
//! │    span := child of captured context, activated      │
//! │    body runs · failure recorded on span              │
//! │    span closed · prior context restored              │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! submit under active context C:
//!   wrap ──► capture C ──► delegate schedules unit
//!
//! worker executes:
//!   activate(child of C) ──► run body ──► restore C
//!        └─ holds on success, failure, panic, cancellation
//!
//! degraded mode (provider gone or closing):
//!   wrap is skipped entirely; unit runs exactly as if undecorated
//! ```
//!
//! ## Features
//! | Area              | Description                                                         | Key types / traits                       |
//! |-------------------|---------------------------------------------------------------------|------------------------------------------|
//! | **Decoration**    | Full executor contract over any delegate, wrap-once per executor.   | [`TracedExecutor`], [`ExecutorRegistry`] |
//! | **Capture**       | Units carrying the submission-time trace context.                   | [`TracedJob`], [`TracedCall`]            |
//! | **Contracts**     | Executor surface and unit shapes.                                   | [`TaskExecutor`], [`Job`], [`Call`]      |
//! | **Collaborators** | Pluggable tracing backend and naming.                               | [`Tracer`], [`Span`], [`SpanNamer`]      |
//! | **Reference**     | In-tree delegate and tracer doubles.                                | [`TokioExecutor`], [`RecordingTracer`]   |
//! | **Errors**        | Typed errors for the executor surface and task outcomes.            | [`ExecutorError`], [`TaskError`]         |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use taskspan::{
//!     CallFn, DefaultSpanNamer, ExecutorRegistry, JobFn, JobRef, RecordingTracer,
//!     StaticProvider, TaskError, TaskExecutor, TokioExecutor,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Host wiring: a tracer, a namer, a provider, one registry.
//!     let tracer = Arc::new(RecordingTracer::new());
//!     let provider = StaticProvider::arc(tracer.clone(), Arc::new(DefaultSpanNamer));
//!     let registry = ExecutorRegistry::new(&provider);
//!
//!     // Wrap the pool once; repeated wraps return the same decorator.
//!     let pool = Arc::new(TokioExecutor::new());
//!     let traced = registry.wrap_named(&pool, "ingest");
//!
//!     let job: JobRef = JobFn::arc("hello", |_ctx: CancellationToken| async {
//!         Ok::<(), TaskError>(())
//!     });
//!     traced.execute(job)?;
//!
//!     let sum = traced.submit(CallFn::arc("add", |_ctx: CancellationToken| async {
//!         Ok::<_, TaskError>(2 + 2)
//!     }))?;
//!     assert_eq!(sum.await?, 4);
//!
//!     traced.shutdown();
//!     traced.await_termination(std::time::Duration::from_secs(1)).await;
//!     assert!(tracer.snapshot().iter().all(|span| span.ended));
//!     Ok(())
//! }
//! ```

mod error;
mod executor;
mod instrument;
mod tasks;
mod trace;

// ---- Public re-exports ----

pub use error::{ExecutorError, TaskError};
pub use executor::{TaskExecutor, TaskHandle, TokioExecutor};
pub use instrument::{ExecutorRegistry, TracedCall, TracedExecutor, TracedJob};
pub use tasks::{Call, CallFn, CallRef, Job, JobFn, JobRef};
pub use trace::{
    context_unusable, DefaultSpanNamer, NoopTracer, RecordedSpan, RecordingTracer, Span,
    SpanContext, SpanId, SpanNamer, SpanRef, StaticProvider, TraceId, TraceProvider, Tracer,
};
