//! # Capability lookup for tracing collaborators.
//!
//! [`TraceProvider`] stands in for whatever wiring owns the tracer and namer
//! in a host application (a service registry, an injection container). The
//! instrumentation layer resolves both capabilities lazily through it and
//! holds it weakly, so a torn-down provider is observable rather than kept
//! alive.
//!
//! [`StaticProvider`] is the in-tree implementation: fixed capabilities plus
//! a `close()` switch, enough for tests, demos, and applications without a
//! container of their own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::namer::SpanNamer;
use super::tracer::Tracer;

/// Supplies tracing capabilities on demand.
///
/// `None` from either lookup means the capability is not available; callers
/// degrade to untraced execution rather than failing.
pub trait TraceProvider: Send + Sync + 'static {
    /// Resolves the tracer, if one is available.
    fn tracer(&self) -> Option<Arc<dyn Tracer>>;

    /// Resolves the span namer, if one is available.
    fn span_namer(&self) -> Option<Arc<dyn SpanNamer>>;

    /// True while the provider is tearing down and lookups are meaningless.
    fn is_closing(&self) -> bool {
        false
    }
}

/// Provider over fixed capabilities with an explicit closing switch.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use taskspan::{DefaultSpanNamer, NoopTracer, StaticProvider, TraceProvider};
///
/// let provider = StaticProvider::arc(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
/// assert!(!provider.is_closing());
///
/// provider.close();
/// assert!(provider.is_closing());
/// ```
pub struct StaticProvider {
    tracer: Arc<dyn Tracer>,
    namer: Arc<dyn SpanNamer>,
    closing: AtomicBool,
}

impl StaticProvider {
    /// Creates a provider over the given capabilities.
    pub fn new(tracer: Arc<dyn Tracer>, namer: Arc<dyn SpanNamer>) -> Self {
        Self {
            tracer,
            namer,
            closing: AtomicBool::new(false),
        }
    }

    /// Creates the provider and returns it as a shared handle.
    pub fn arc(tracer: Arc<dyn Tracer>, namer: Arc<dyn SpanNamer>) -> Arc<Self> {
        Arc::new(Self::new(tracer, namer))
    }

    /// Marks the provider as closing. Irreversible.
    pub fn close(&self) {
        self.closing.store(true, Ordering::Release);
    }
}

impl TraceProvider for StaticProvider {
    fn tracer(&self) -> Option<Arc<dyn Tracer>> {
        if self.is_closing() {
            return None;
        }
        Some(Arc::clone(&self.tracer))
    }

    fn span_namer(&self) -> Option<Arc<dyn SpanNamer>> {
        if self.is_closing() {
            return None;
        }
        Some(Arc::clone(&self.namer))
    }

    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::namer::DefaultSpanNamer;
    use crate::trace::noop::NoopTracer;

    #[test]
    fn test_open_provider_resolves_capabilities() {
        let provider = StaticProvider::new(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
        assert!(provider.tracer().is_some());
        assert!(provider.span_namer().is_some());
    }

    #[test]
    fn test_closed_provider_resolves_nothing() {
        let provider = StaticProvider::new(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
        provider.close();
        assert!(provider.tracer().is_none());
        assert!(provider.span_namer().is_none());
        assert!(provider.is_closing());
    }
}
