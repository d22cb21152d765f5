//! # Degraded-mode predicate.
//!
//! Answers one question for the instrumentation layer: is the tracing
//! context currently safe to use? When it is not, every submission path runs
//! tasks undecorated, silently. This predicate never panics and holds no
//! state.

use std::sync::Weak;

use super::provider::TraceProvider;

/// True when tracing capabilities cannot be used.
///
/// Holds when the provider has been dropped (the weak handle no longer
/// upgrades) or reports that it is closing. This is the sole degraded-mode
/// switch: callers seeing `true` must bypass wrapping entirely.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use taskspan::{context_unusable, DefaultSpanNamer, NoopTracer, StaticProvider, TraceProvider};
///
/// let provider = StaticProvider::arc(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
/// let provider: Arc<dyn TraceProvider> = provider;
/// let weak: std::sync::Weak<dyn TraceProvider> = Arc::downgrade(&provider);
///
/// assert!(!context_unusable(&weak));
///
/// drop(provider);
/// assert!(context_unusable(&weak));
/// ```
pub fn context_unusable(provider: &Weak<dyn TraceProvider>) -> bool {
    match provider.upgrade() {
        Some(provider) => provider.is_closing(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::namer::DefaultSpanNamer;
    use crate::trace::noop::NoopTracer;
    use crate::trace::provider::StaticProvider;
    use std::sync::Arc;

    fn weak(provider: &Arc<StaticProvider>) -> Weak<dyn TraceProvider> {
        let provider: Arc<dyn TraceProvider> = provider.clone();
        let weak: Weak<dyn TraceProvider> = Arc::downgrade(&provider);
        weak
    }

    #[test]
    fn test_usable_while_provider_open() {
        let provider = StaticProvider::arc(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
        assert!(!context_unusable(&weak(&provider)));
    }

    #[test]
    fn test_unusable_when_closing() {
        let provider = StaticProvider::arc(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
        provider.close();
        assert!(context_unusable(&weak(&provider)));
    }

    #[test]
    fn test_unusable_after_drop() {
        let provider = StaticProvider::arc(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
        let w = weak(&provider);
        drop(provider);
        assert!(context_unusable(&w));
    }
}
