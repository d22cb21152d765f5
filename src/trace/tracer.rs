//! # Tracer and span contracts.
//!
//! [`Tracer`] is the backend collaborator: it knows what context is active at
//! the call site, opens spans, and maintains the active-context slot through
//! an explicit activate/restore protocol. [`Span`] is one timed, named record
//! of traced work with a parent link to its causal predecessor.
//!
//! Span storage, sampling, and export belong to the implementation; this
//! crate only drives the protocol.
//!
//! ## Rules
//! - [`Tracer::activate`] returns the previously active context; whoever
//!   activates is responsible for handing that value back to
//!   [`Tracer::restore`] when the activation ends.
//! - [`Tracer::start_span`] does **not** activate the span.
//! - [`Span::end`] is called exactly once per span; behavior of recording
//!   after `end` is implementation-defined.

use crate::error::TaskError;

use super::context::SpanContext;

/// Owned handle to a span in flight.
pub type SpanRef = Box<dyn Span>;

/// A timed, named record of one unit of traced work.
pub trait Span: Send + Sync + 'static {
    /// Returns the identity of this span.
    fn context(&self) -> SpanContext;

    /// Records a task failure on the span. Does not close it.
    fn record_failure(&self, error: &TaskError);

    /// Closes the span.
    fn end(&self);
}

/// Backend contract for span creation and active-context management.
pub trait Tracer: Send + Sync + 'static {
    /// Returns the context the tracer considers active at the call site.
    ///
    /// Returns [`SpanContext::inactive`] when no trace is active.
    fn current_context(&self) -> SpanContext;

    /// Opens a new span as a child of `parent`.
    ///
    /// An inactive `parent` starts a new trace. The span is not activated.
    fn start_span(&self, parent: &SpanContext, name: &str) -> SpanRef;

    /// Makes `context` the active context and returns the prior one.
    fn activate(&self, context: &SpanContext) -> SpanContext;

    /// Re-establishes `prior` as the active context.
    fn restore(&self, prior: SpanContext);
}
