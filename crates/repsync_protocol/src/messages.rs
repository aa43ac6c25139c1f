//! Push request and response envelopes.

use crate::conflict::Conflict;
use crate::operation::SyncOperation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/sync/push`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    /// Operations in client submission order.
    pub operations: Vec<SyncOperation>,
}

impl PushRequest {
    /// Creates a push request.
    pub fn new(operations: Vec<SyncOperation>) -> Self {
        Self { operations }
    }
}

/// A successfully applied operation, echoed with server-assigned state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedOperation {
    /// The operation as submitted.
    pub operation: SyncOperation,
    /// The record's version after the mutation.
    ///
    /// Absent for the idempotent delete of a record that never
    /// existed; there is nothing to version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<u64>,
    /// When the server applied the mutation.
    pub applied_at: DateTime<Utc>,
}

/// An operation the server detected a conflict for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictedOperation {
    /// The operation as submitted.
    pub operation: SyncOperation,
    /// The detected conflict.
    pub conflict: Conflict,
}

/// An operation that could not be processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedOperation {
    /// The operation as submitted.
    pub operation: SyncOperation,
    /// Why it failed.
    pub error: String,
}

/// The three-way partition returned for a push batch.
///
/// Every submitted operation lands in exactly one of the three lists.
/// A batch is never reported as a single pass/fail verdict; partial
/// success is the normal case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushResponse {
    /// Applied operations.
    pub succeeded: Vec<AcceptedOperation>,
    /// Operations the client must reconcile.
    pub conflicts: Vec<ConflictedOperation>,
    /// Operations that were rejected or errored.
    pub failed: Vec<FailedOperation>,
}

impl PushResponse {
    /// Creates an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an applied operation.
    pub fn accept(
        &mut self,
        operation: SyncOperation,
        server_version: Option<u64>,
        applied_at: DateTime<Utc>,
    ) {
        self.succeeded.push(AcceptedOperation {
            operation,
            server_version,
            applied_at,
        });
    }

    /// Records a conflicted operation.
    pub fn conflict(&mut self, operation: SyncOperation, conflict: Conflict) {
        self.conflicts.push(ConflictedOperation {
            operation,
            conflict,
        });
    }

    /// Records a failed operation.
    pub fn fail(&mut self, operation: SyncOperation, error: impl Into<String>) {
        self.failed.push(FailedOperation {
            operation,
            error: error.into(),
        });
    }

    /// Total number of partitioned operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.conflicts.len() + self.failed.len()
    }

    /// Returns true if no operations were partitioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every operation was applied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.failed.is_empty()
    }
}
