//! # Inert tracer.
//!
//! [`NoopTracer`] satisfies the [`Tracer`] contract without recording
//! anything: contexts are always inactive, spans ignore every call. Useful
//! when a host wires the instrumentation layer but tracing is switched off.

use crate::error::TaskError;

use super::context::SpanContext;
use super::tracer::{Span, SpanRef, Tracer};

/// Tracer that records nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

struct NoopSpan;

impl Span for NoopSpan {
    fn context(&self) -> SpanContext {
        SpanContext::inactive()
    }

    fn record_failure(&self, _error: &TaskError) {}

    fn end(&self) {}
}

impl Tracer for NoopTracer {
    fn current_context(&self) -> SpanContext {
        SpanContext::inactive()
    }

    fn start_span(&self, _parent: &SpanContext, _name: &str) -> SpanRef {
        Box::new(NoopSpan)
    }

    fn activate(&self, _context: &SpanContext) -> SpanContext {
        SpanContext::inactive()
    }

    fn restore(&self, _prior: SpanContext) {}
}
