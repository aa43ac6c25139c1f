//! # RepSync Engine
//!
//! Batch reconciliation engine for RepSync.
//!
//! This crate provides:
//! - `Reconciler` — applies a pushed batch in submission order and
//!   partitions results into succeeded / conflicts / failed
//! - The generic per-entity operation routine (one state machine for
//!   create/update/delete, parameterized by entity kind)
//! - The change-log recorder (best-effort audit trail)
//!
//! # Error isolation
//!
//! Each operation is atomic with respect to itself only. A storage
//! failure, conflict, or rejection of one operation never aborts the
//! rest of the batch; the caller always receives the full three-way
//! partition.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod apply;
mod changelog;
mod context;
mod reconciler;

pub use apply::{apply_operation, Applied, OpOutcome};
pub use changelog::{
    ChangeLogEntry, ChangeLogError, ChangeLogRecorder, JsonlChangeLog, MemoryChangeLog,
};
pub use context::CallerContext;
pub use reconciler::Reconciler;
