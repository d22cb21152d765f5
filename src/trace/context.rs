//! # Trace and span identity.
//!
//! [`SpanContext`] identifies the active span at a point in execution: a
//! 128-bit [`TraceId`] shared by every span of one trace, and a 64-bit
//! [`SpanId`] unique to the span. The all-zero value is *inactive* and means
//! "no trace is active here".
//!
//! Contexts are small `Copy` values: captured at submission time and carried
//! into whichever worker eventually runs the task, never shared mutable state.
//!
//! ## Example
//! ```rust
//! use taskspan::SpanContext;
//!
//! let root = SpanContext::new_root();
//! let child = root.child();
//!
//! assert!(root.is_active());
//! assert_eq!(child.trace_id(), root.trace_id());
//! assert_ne!(child.span_id(), root.span_id());
//! assert!(!SpanContext::inactive().is_active());
//! ```

use std::fmt;

/// 128-bit trace identifier, shared by all spans of one trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Generates a fresh random trace id. Zero is reserved for "no trace".
    pub fn random() -> Self {
        Self(rand::random::<u128>().max(1))
    }

    /// True for the reserved all-zero id.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// 64-bit span identifier, unique within a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// Generates a fresh random span id. Zero is reserved for "no span".
    pub fn random() -> Self {
        Self(rand::random::<u64>().max(1))
    }

    /// True for the reserved all-zero id.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Identity of the currently active span at a point in execution.
///
/// A context is either *active* (both ids non-zero) or *inactive* (both
/// zero). Captured by value at task submission and used as the parent of the
/// span opened around the task body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
}

impl SpanContext {
    /// The inactive context: no trace is active.
    pub fn inactive() -> Self {
        Self {
            trace_id: TraceId(0),
            span_id: SpanId(0),
        }
    }

    /// A fresh root context: new trace id, new span id.
    pub fn new_root() -> Self {
        Self {
            trace_id: TraceId::random(),
            span_id: SpanId::random(),
        }
    }

    /// A child of this context: same trace, fresh span id.
    ///
    /// A child of the inactive context starts a new root instead, so tracers
    /// can derive span identity unconditionally from a captured parent.
    pub fn child(&self) -> Self {
        if !self.is_active() {
            return Self::new_root();
        }
        Self {
            trace_id: self.trace_id,
            span_id: SpanId::random(),
        }
    }

    /// True when a trace is active (both ids non-zero).
    pub fn is_active(&self) -> bool {
        !self.trace_id.is_zero() && !self.span_id.is_zero()
    }

    /// Returns the trace id.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Returns the span id.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }
}

impl fmt::Display for SpanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.trace_id, self.span_id)
    }
}
