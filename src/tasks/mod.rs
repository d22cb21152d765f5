//! # Units of work accepted by executors.
//!
//! Two shapes, mirroring the two submission surfaces:
//! - [`Job`] - fire-and-forget unit, no produced value;
//! - [`Call`] - value-producing unit.
//!
//! Both are async, cancelable through a `CancellationToken`, and shared as
//! `Arc<dyn ...>` handles ([`JobRef`], [`CallRef`]). [`JobFn`] and [`CallFn`]
//! wrap closures so ad hoc units need no trait impl of their own.

mod call;
mod job;

pub use call::{Call, CallFn, CallRef};
pub use job::{Job, JobFn, JobRef};
