//! Batch reconciliation.

use crate::apply::{apply_operation, OpOutcome};
use crate::changelog::{ChangeLogEntry, ChangeLogRecorder};
use crate::context::CallerContext;
use chrono::Utc;
use repsync_protocol::{EntityKind, PushResponse, SyncOperation};
use repsync_store::EntityStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Applies pushed batches of client operations.
///
/// Operations are processed strictly in submission order, one at a
/// time. Every operation lands in exactly one partition of the
/// response; one operation's failure never suppresses another's
/// result and there is no cross-operation transaction.
pub struct Reconciler {
    store: Arc<dyn EntityStore>,
    changelog: Arc<dyn ChangeLogRecorder>,
}

impl Reconciler {
    /// Creates a reconciler over a store and a change-log recorder.
    pub fn new(store: Arc<dyn EntityStore>, changelog: Arc<dyn ChangeLogRecorder>) -> Self {
        Self { store, changelog }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Applies a batch and partitions the results.
    pub fn apply_batch(
        &self,
        caller: &CallerContext,
        operations: Vec<SyncOperation>,
    ) -> PushResponse {
        let mut response = PushResponse::new();

        for op in operations {
            // Tenant isolation precedes any data access.
            if op.tenant_id != caller.tenant_id {
                debug!(op_id = %op.id, claimed = %op.tenant_id, "tenant mismatch");
                response.fail(op, "Tenant access denied");
                continue;
            }

            let Some(kind) = op.entity_kind() else {
                let reason = format!("Unknown entity type: {}", op.entity);
                response.fail(op, reason);
                continue;
            };

            match apply_operation(self.store.as_ref(), caller, &op, kind) {
                Ok(OpOutcome::Applied(applied)) => {
                    if applied.persisted {
                        self.record_change(caller, &op, kind, applied.snapshot);
                    }
                    debug!(op_id = %op.id, entity = %op.entity_id, version = ?applied.server_version, "applied");
                    response.accept(op, applied.server_version, Utc::now());
                }
                Ok(OpOutcome::Conflicted(conflict)) => {
                    debug!(op_id = %op.id, entity = %op.entity_id, kind = ?conflict.kind, "conflict");
                    response.conflict(op, conflict);
                }
                Ok(OpOutcome::Rejected(reason)) => {
                    response.fail(op, reason);
                }
                Err(err) => {
                    warn!(op_id = %op.id, error = %err, "storage failure while applying operation");
                    response.fail(op, "Database operation failed");
                }
            }
        }

        response
    }

    fn record_change(
        &self,
        caller: &CallerContext,
        op: &SyncOperation,
        kind: EntityKind,
        snapshot: Option<Value>,
    ) {
        let entry = ChangeLogEntry {
            entity_kind: kind,
            entity_id: op.entity_id.clone(),
            operation: op.op_type,
            data: snapshot,
            tenant_id: caller.tenant_id.clone(),
            recorded_at: Utc::now(),
        };

        // Best-effort audit trail: the mutation stands either way.
        if let Err(err) = self.changelog.record(entry) {
            warn!(op_id = %op.id, error = %err, "change log write failed");
        }
    }
}
