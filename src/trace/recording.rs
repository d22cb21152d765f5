//! # In-memory tracer for tests and demos.
//!
//! [`RecordingTracer`] keeps the active context in a shared slot and logs
//! every span it opens. [`RecordingTracer::snapshot`] returns the log as
//! plain [`RecordedSpan`] values, so a test can assert parent links, names,
//! recorded failures, and that spans were closed.
//!
//! The active-context slot is a single shared cell. That is exact on a
//! current-thread runtime and for sequential submissions; it is not a
//! per-worker context store and does not try to be one.
//!
//! ## Example
//! ```rust
//! use taskspan::{RecordingTracer, Span, SpanContext, Tracer};
//!
//! let tracer = RecordingTracer::new();
//! let parent = SpanContext::new_root();
//!
//! let span = tracer.start_span(&parent, "ingest");
//! let prior = tracer.activate(&span.context());
//! // ... traced work ...
//! span.end();
//! tracer.restore(prior);
//!
//! let spans = tracer.snapshot();
//! assert_eq!(spans[0].name, "ingest");
//! assert_eq!(spans[0].parent, parent);
//! assert!(spans[0].ended);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::TaskError;

use super::context::SpanContext;
use super::tracer::{Span, SpanRef, Tracer};

/// Snapshot of one span opened by a [`RecordingTracer`].
#[derive(Clone, Debug)]
pub struct RecordedSpan {
    /// Name the span was opened with.
    pub name: String,
    /// Identity of the span.
    pub context: SpanContext,
    /// Parent context the span was opened under.
    pub parent: SpanContext,
    /// Failure recorded on the span, if any.
    pub failure: Option<String>,
    /// Whether the span has been closed.
    pub ended: bool,
}

struct SpanCell {
    name: String,
    context: SpanContext,
    parent: SpanContext,
    failure: Mutex<Option<String>>,
    ended: AtomicBool,
}

impl SpanCell {
    fn snapshot(&self) -> RecordedSpan {
        RecordedSpan {
            name: self.name.clone(),
            context: self.context,
            parent: self.parent,
            failure: self
                .failure
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            ended: self.ended.load(Ordering::Acquire),
        }
    }
}

struct RecordingSpan {
    cell: Arc<SpanCell>,
}

impl Span for RecordingSpan {
    fn context(&self) -> SpanContext {
        self.cell.context
    }

    fn record_failure(&self, error: &TaskError) {
        *self
            .cell
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error.to_string());
    }

    fn end(&self) {
        self.cell.ended.store(true, Ordering::Release);
    }
}

/// Tracer that keeps everything in memory.
pub struct RecordingTracer {
    current: Mutex<SpanContext>,
    spans: Mutex<Vec<Arc<SpanCell>>>,
}

impl RecordingTracer {
    /// Creates an empty tracer with no active context.
    pub fn new() -> Self {
        Self {
            current: Mutex::new(SpanContext::inactive()),
            spans: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every span opened so far, in open order.
    pub fn snapshot(&self) -> Vec<RecordedSpan> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|cell| cell.snapshot())
            .collect()
    }
}

impl Default for RecordingTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer for RecordingTracer {
    fn current_context(&self) -> SpanContext {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_span(&self, parent: &SpanContext, name: &str) -> SpanRef {
        let cell = Arc::new(SpanCell {
            name: name.to_string(),
            context: parent.child(),
            parent: *parent,
            failure: Mutex::new(None),
            ended: AtomicBool::new(false),
        });
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&cell));
        Box::new(RecordingSpan { cell })
    }

    fn activate(&self, context: &SpanContext) -> SpanContext {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, *context)
    }

    fn restore(&self, prior: SpanContext) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = prior;
    }
}
