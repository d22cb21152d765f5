//! # Scoped span activation.
//!
//! [`SpanScope`] owns one span and the activation protocol around it: opened
//! as a child of a captured context, active while the scope lives, closed and
//! de-activated on drop. Dropping is the only way out, so the span is closed
//! and the prior context restored on every exit path — return, error
//! propagation, panic unwind, and mid-await cancellation alike.

use std::sync::Arc;

use crate::error::TaskError;
use crate::trace::{SpanContext, SpanRef, Tracer};

/// Span held active for the duration of one task body.
///
/// Drop order matters: the span is closed first, then the previously active
/// context is handed back to the tracer.
pub(crate) struct SpanScope {
    tracer: Arc<dyn Tracer>,
    span: SpanRef,
    prior: Option<SpanContext>,
}

impl SpanScope {
    /// Opens a span named `name` as a child of `parent` and activates it.
    pub(crate) fn open(tracer: Arc<dyn Tracer>, parent: &SpanContext, name: &str) -> Self {
        let span = tracer.start_span(parent, name);
        let prior = tracer.activate(&span.context());
        Self {
            tracer,
            span,
            prior: Some(prior),
        }
    }

    /// Records a task failure on the held span.
    pub(crate) fn record_failure(&self, error: &TaskError) {
        self.span.record_failure(error);
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        self.span.end();
        if let Some(prior) = self.prior.take() {
            self.tracer.restore(prior);
        }
    }
}
