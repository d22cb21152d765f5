//! # Trace instrumentation over executors.
//!
//! The core of the crate: wrap an executor once, and every unit of work it
//! accepts re-establishes the submitter's trace context around its body.
//!
//! ## Architecture
//! ```text
//! caller ──► ExecutorRegistry::wrap(pool) ──► TracedExecutor (one per pool)
//!                                                │ per submission
//!                                                ▼
//!                        context_unusable(provider)? ──yes──► delegate as-is
//!                                                │ no
//!                                                ▼
//!                      TracedJob / TracedCall captures current_context()
//!                                                │ delegate schedules
//!                                                ▼ worker runs the unit
//!                      span opened as child of the captured context
//!                      body runs · failure recorded · span closed
//!                      prior context restored
//! ```
//!
//! ## Rules
//! - Lifecycle calls pass straight through; only submissions are wrapped.
//! - Wrapping never fails and never changes how a task's own failure
//!   surfaces.
//! - An unusable provider silently disables wrapping; tasks still run.

mod captured;
mod registry;
mod scope;
mod traced;

pub use captured::{TracedCall, TracedJob};
pub use registry::ExecutorRegistry;
pub use traced::TracedExecutor;
