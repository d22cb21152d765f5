//! # Span-name derivation.
//!
//! When no explicit span name is configured on a wrapped executor, the span
//! opened around a task body is named after the task itself. [`SpanNamer`]
//! turns the task's raw name (often a full type path) into something readable
//! on a trace view.

/// Derives a span name from a task's raw name.
pub trait SpanNamer: Send + Sync + 'static {
    /// Returns the span name to use for a task whose own name is `raw`.
    fn name_for(&self, raw: &str) -> String;
}

/// Default namer: shortens a type path to its final segment.
///
/// Generic parameters are stripped first, then everything up to the last
/// `::`. An empty result falls back to `"task"`.
///
/// # Example
/// ```
/// use taskspan::{DefaultSpanNamer, SpanNamer};
///
/// let namer = DefaultSpanNamer;
/// assert_eq!(namer.name_for("my_app::jobs::Reindex<T>"), "Reindex");
/// assert_eq!(namer.name_for("flush"), "flush");
/// assert_eq!(namer.name_for(""), "task");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSpanNamer;

impl SpanNamer for DefaultSpanNamer {
    fn name_for(&self, raw: &str) -> String {
        let head = raw.split('<').next().unwrap_or(raw);
        let short = head.rsplit("::").next().unwrap_or(head).trim();
        if short.is_empty() {
            "task".to_string()
        } else {
            short.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_module_path() {
        assert_eq!(DefaultSpanNamer.name_for("a::b::Worker"), "Worker");
    }

    #[test]
    fn test_strips_generics() {
        assert_eq!(
            DefaultSpanNamer.name_for("taskspan::tasks::JobFn<closure>"),
            "JobFn"
        );
    }

    #[test]
    fn test_plain_name_passes_through() {
        assert_eq!(DefaultSpanNamer.name_for("job-A"), "job-A");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(DefaultSpanNamer.name_for(""), "task");
        assert_eq!(DefaultSpanNamer.name_for("  "), "task");
    }
}
