//! # RepSync Protocol
//!
//! Wire types for the RepSync push protocol.
//!
//! This crate provides:
//! - `SyncOperation` for client-submitted mutations
//! - Typed entity payloads and payload normalization
//! - `Conflict` for conflict reporting
//! - Push request/response envelopes
//!
//! This is a pure protocol crate with no I/O operations. All types
//! serialize to the JSON shapes the sync endpoint speaks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod conflict;
mod entities;
mod ids;
mod messages;
mod operation;

pub use conflict::{Conflict, ConflictKind};
pub use entities::{
    normalize_create, submitted_version, update_changes, ExerciseFields, PayloadError, SetFields,
    UserProfileFields, WorkoutFields,
};
pub use ids::{EntityId, TenantId, UserId};
pub use messages::{
    AcceptedOperation, ConflictedOperation, FailedOperation, PushRequest, PushResponse,
};
pub use operation::{EntityKind, OperationType, SyncOperation};
