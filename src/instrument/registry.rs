//! # Idempotent decorator registry.
//!
//! [`ExecutorRegistry`] guarantees that a given underlying executor is
//! decorated at most once: the first `wrap` for a delegate constructs and
//! caches the decorator, every later `wrap` for the *same* delegate (pointer
//! identity) returns the cached instance — regardless of any span name
//! supplied on the later call, and regardless of which caller wins a race.
//!
//! The registry is an explicit instance wired with a provider, not ambient
//! process state; hosts create one and pass it around.
//!
//! ## Rules
//! - Insert-if-absent runs under one lock: concurrent `wrap` calls for one
//!   delegate construct exactly one decorator.
//! - Entries are never evicted. An entry keeps its delegate alive, so a
//!   pointer key is never reused for a different executor.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::executor::TaskExecutor;
use crate::trace::TraceProvider;

use super::traced::TracedExecutor;

/// Process-lifetime cache of decorators, one per underlying executor.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use taskspan::{
///     DefaultSpanNamer, ExecutorRegistry, NoopTracer, StaticProvider, TokioExecutor,
/// };
///
/// let provider = StaticProvider::arc(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
/// let registry = ExecutorRegistry::new(&provider);
///
/// let pool = Arc::new(TokioExecutor::new());
/// let first = registry.wrap_named(&pool, "ingest");
/// let again = registry.wrap(&pool);
///
/// assert!(Arc::ptr_eq(&first, &again));
/// ```
pub struct ExecutorRegistry {
    provider: Weak<dyn TraceProvider>,
    entries: Mutex<HashMap<usize, Arc<dyn Any + Send + Sync>>>,
}

impl ExecutorRegistry {
    /// Creates a registry resolving capabilities through `provider`.
    pub fn new<P>(provider: &Arc<P>) -> Self
    where
        P: TraceProvider,
    {
        let provider: Arc<dyn TraceProvider> = provider.clone();
        let provider: Weak<dyn TraceProvider> = Arc::downgrade(&provider);
        Self {
            provider,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the decorator for `delegate`, constructing it on first use.
    pub fn wrap<E>(&self, delegate: &Arc<E>) -> Arc<TracedExecutor<E>>
    where
        E: TaskExecutor,
    {
        self.wrap_inner(delegate, None)
    }

    /// Like [`wrap`](Self::wrap), with a logical span name applied to every
    /// unit the decorator schedules.
    ///
    /// The name only takes effect when this call constructs the decorator; a
    /// delegate wrapped earlier keeps its original configuration.
    pub fn wrap_named<E>(
        &self,
        delegate: &Arc<E>,
        span_name: impl Into<Cow<'static, str>>,
    ) -> Arc<TracedExecutor<E>>
    where
        E: TaskExecutor,
    {
        self.wrap_inner(delegate, Some(span_name.into()))
    }

    fn wrap_inner<E>(
        &self,
        delegate: &Arc<E>,
        span_name: Option<Cow<'static, str>>,
    ) -> Arc<TracedExecutor<E>>
    where
        E: TaskExecutor,
    {
        let key = Arc::as_ptr(delegate) as usize;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(key).or_insert_with(|| {
            Arc::new(TracedExecutor::from_parts(
                self.provider.clone(),
                Arc::clone(delegate),
                span_name,
            ))
        });
        match Arc::clone(entry).downcast::<TracedExecutor<E>>() {
            Ok(traced) => traced,
            // a key always maps to the decorator built for that delegate;
            // this arm is a safety net, not a code path
            Err(_entry) => Arc::new(TracedExecutor::from_parts(
                self.provider.clone(),
                Arc::clone(delegate),
                None,
            )),
        }
    }

    /// Number of distinct executors wrapped so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been wrapped yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::TokioExecutor;
    use crate::trace::{DefaultSpanNamer, NoopTracer, StaticProvider};

    fn registry() -> (Arc<StaticProvider>, ExecutorRegistry) {
        let provider = StaticProvider::arc(Arc::new(NoopTracer), Arc::new(DefaultSpanNamer));
        let registry = ExecutorRegistry::new(&provider);
        (provider, registry)
    }

    #[test]
    fn test_same_delegate_same_decorator() {
        let (_provider, registry) = registry();
        let pool = Arc::new(TokioExecutor::new());

        let first = registry.wrap(&pool);
        let again = registry.wrap(&pool);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_later_name_is_ignored_for_cached_delegate() {
        let (_provider, registry) = registry();
        let pool = Arc::new(TokioExecutor::new());

        let first = registry.wrap_named(&pool, "first");
        let renamed = registry.wrap_named(&pool, "second");
        assert!(Arc::ptr_eq(&first, &renamed));
    }

    #[test]
    fn test_distinct_delegates_get_distinct_decorators() {
        let (_provider, registry) = registry();
        let a = Arc::new(TokioExecutor::new());
        let b = Arc::new(TokioExecutor::new());

        let wrapped_a = registry.wrap(&a);
        let wrapped_b = registry.wrap(&b);
        assert!(!Arc::ptr_eq(&wrapped_a, &wrapped_b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_wrap_constructs_one_decorator() {
        let (_provider, registry) = registry();
        let registry = Arc::new(registry);
        let pool = Arc::new(TokioExecutor::new());

        let mut workers = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            let pool = Arc::clone(&pool);
            workers.push(std::thread::spawn(move || registry.wrap(&pool)));
        }

        let mut wrapped = Vec::new();
        for worker in workers {
            wrapped.push(worker.join().expect("wrap thread panicked"));
        }

        for other in &wrapped[1..] {
            assert!(Arc::ptr_eq(&wrapped[0], other));
        }
        assert_eq!(registry.len(), 1);
    }
}
