//! # Executor contract and reference implementation.
//!
//! [`TaskExecutor`] is the full task-executor surface this crate decorates:
//! fire-and-forget execution, value-producing submissions, batch waits and
//! races, and lifecycle control. [`TaskHandle`] is the future a submission
//! returns. [`TokioExecutor`] is the in-tree delegate backed by `tokio`
//! tasks.

mod handle;
mod pool;
mod task_executor;

pub use handle::TaskHandle;
pub use pool::TokioExecutor;
pub use task_executor::TaskExecutor;
