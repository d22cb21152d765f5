//! Error types used by executors and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`ExecutorError`] — errors raised by the executor surface itself
//!   (rejected submissions, empty batches, batch timeouts).
//! - [`TaskError`] — errors raised by individual task executions, delivered
//!   through handle resolution or the synchronous call path.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the executor surface.
///
/// These represent failures of the submission machinery, not of the tasks
/// themselves. A task's own failure travels through its handle as a
/// [`TaskError`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The executor is shut down and no longer accepts work.
    #[error("executor is shut down; submission rejected")]
    Rejected,

    /// A batch race was requested over an empty collection of tasks.
    #[error("empty task batch")]
    EmptyBatch,

    /// A batch did not produce a result within its timeout budget.
    #[error("batch timed out after {timeout:?}")]
    Timeout {
        /// The timeout budget that was exceeded.
        timeout: Duration,
    },

    /// Every task in a batch race failed; no result could be produced.
    #[error("all tasks in batch failed; last: {last}")]
    AllFailed {
        /// The error of the last task to fail.
        last: TaskError,
    },
}

impl ExecutorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskspan::ExecutorError;
    ///
    /// assert_eq!(ExecutorError::Rejected.as_label(), "executor_rejected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecutorError::Rejected => "executor_rejected",
            ExecutorError::EmptyBatch => "executor_empty_batch",
            ExecutorError::Timeout { .. } => "executor_timeout",
            ExecutorError::AllFailed { .. } => "executor_all_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ExecutorError::Rejected => "submission rejected: executor shut down".to_string(),
            ExecutorError::EmptyBatch => "empty batch".to_string(),
            ExecutorError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ExecutorError::AllFailed { last } => format!("all failed; last: {last}"),
        }
    }
}

/// # Errors produced by task execution.
///
/// These represent failures of individual units of work submitted to an
/// executor. They surface through the same channel whether the unit runs
/// decorated or not: the task's handle, or the synchronous batch result.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The task body panicked; the panic was contained by the executor.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// The task was cancelled before or during execution.
    #[error("task cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskspan::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "cancelled".to_string(),
        }
    }

    /// Indicates whether the error is a cancellation rather than a real failure.
    ///
    /// # Example
    /// ```
    /// use taskspan::TaskError;
    ///
    /// assert!(TaskError::Canceled.is_cancellation());
    /// assert!(!TaskError::Fail { error: "boom".into() }.is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}
