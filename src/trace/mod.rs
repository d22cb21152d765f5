//! # Tracing collaborators and trace identity.
//!
//! This module defines the contracts the instrumentation layer consumes:
//! - [`SpanContext`] - the identity of the currently active span at a point
//!   in execution ([`TraceId`] + [`SpanId`]);
//! - [`Tracer`] / [`Span`] - the backend contract for starting, activating,
//!   and closing spans;
//! - [`SpanNamer`] - default span-name derivation when no explicit name is
//!   configured;
//! - [`TraceProvider`] - capability lookup supplying tracer and namer on
//!   demand, with a closing state;
//! - [`context_unusable`] - the degraded-mode predicate.
//!
//! Two tracer implementations ship in-tree: [`NoopTracer`] (inert) and
//! [`RecordingTracer`] (in-memory, for tests and demos). Real backends live
//! outside this crate and plug in through the same traits.

mod context;
mod guard;
mod namer;
mod noop;
mod provider;
mod recording;
mod tracer;

pub use context::{SpanContext, SpanId, TraceId};
pub use guard::context_unusable;
pub use namer::{DefaultSpanNamer, SpanNamer};
pub use noop::NoopTracer;
pub use provider::{StaticProvider, TraceProvider};
pub use recording::{RecordedSpan, RecordingTracer};
pub use tracer::{Span, SpanRef, Tracer};
