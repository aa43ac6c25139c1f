//! The per-entity operation routine.
//!
//! One create/update/delete state machine serves every entity kind;
//! kind-specific behavior enters only through payload normalization.
//! The user profile is the exception: update-only, self-only, and no
//! version gate.

use crate::context::CallerContext;
use repsync_protocol::{
    normalize_create, submitted_version, update_changes, Conflict, EntityKind, OperationType,
    SyncOperation,
};
use repsync_store::{
    DeleteOutcome, EntityStore, InsertOutcome, StoreResult, StoredRecord, UpdateOutcome,
};
use serde_json::Value;

/// A persisted (or idempotently skipped) mutation.
#[derive(Debug, Clone)]
pub struct Applied {
    /// The record's version after the mutation.
    ///
    /// `None` for the delete of a record that never existed.
    pub server_version: Option<u64>,
    /// Whether anything was written. The idempotent delete of an
    /// absent record is the one applied outcome that writes nothing.
    pub persisted: bool,
    /// Record snapshot for the change log; `None` for deletes.
    pub snapshot: Option<Value>,
}

/// Result of applying one operation.
#[derive(Debug, Clone)]
pub enum OpOutcome {
    /// The mutation was applied.
    Applied(Applied),
    /// A conflict was detected; nothing was written.
    Conflicted(Conflict),
    /// The operation was rejected with a client-visible reason.
    Rejected(String),
}

fn applied(record: &StoredRecord, with_snapshot: bool) -> OpOutcome {
    OpOutcome::Applied(Applied {
        server_version: Some(record.version),
        persisted: true,
        snapshot: with_snapshot.then(|| record.snapshot()),
    })
}

/// Applies a single operation against the store.
///
/// Tenant ownership has already been checked by the reconciler, so
/// every storage call here is scoped to the caller's tenant.
///
/// # Errors
///
/// Propagates storage failures; the reconciler downgrades them to a
/// per-operation "failed" entry.
pub fn apply_operation(
    store: &dyn EntityStore,
    caller: &CallerContext,
    op: &SyncOperation,
    kind: EntityKind,
) -> StoreResult<OpOutcome> {
    if kind == EntityKind::User {
        return apply_user(store, caller, op);
    }

    match op.op_type {
        OperationType::Create => apply_create(store, caller, op, kind),
        OperationType::Update => apply_update(store, caller, op, kind),
        OperationType::Delete => apply_delete(store, caller, op, kind),
    }
}

fn apply_create(
    store: &dyn EntityStore,
    caller: &CallerContext,
    op: &SyncOperation,
    kind: EntityKind,
) -> StoreResult<OpOutcome> {
    let data = match normalize_create(kind, &op.payload) {
        Ok(data) => data,
        Err(err) => return Ok(OpOutcome::Rejected(format!("Invalid payload: {err}"))),
    };

    match store.insert_new(&caller.tenant_id, kind, &op.entity_id, data)? {
        InsertOutcome::Inserted(record) => Ok(applied(&record, true)),
        InsertOutcome::Exists(existing) => Ok(OpOutcome::Conflicted(
            Conflict::concurrent_creation(op.payload.clone(), existing.snapshot()),
        )),
    }
}

fn apply_update(
    store: &dyn EntityStore,
    caller: &CallerContext,
    op: &SyncOperation,
    kind: EntityKind,
) -> StoreResult<OpOutcome> {
    let changes = match update_changes(&op.payload) {
        Ok(changes) => changes,
        Err(err) => return Ok(OpOutcome::Rejected(format!("Invalid payload: {err}"))),
    };
    let expected = submitted_version(&op.payload);

    match store.update_if_current(&caller.tenant_id, kind, &op.entity_id, expected, &changes)? {
        UpdateOutcome::Applied(record) => Ok(applied(&record, true)),
        UpdateOutcome::Stale(current) => Ok(OpOutcome::Conflicted(Conflict::update_conflict(
            op.payload.clone(),
            current.snapshot(),
        ))),
        // Offline-created records can be edited before their create
        // ever reached us; the update stands in for the create.
        UpdateOutcome::Missing => apply_create(store, caller, op, kind),
    }
}

fn apply_delete(
    store: &dyn EntityStore,
    caller: &CallerContext,
    op: &SyncOperation,
    kind: EntityKind,
) -> StoreResult<OpOutcome> {
    match store.mark_deleted(&caller.tenant_id, kind, &op.entity_id)? {
        DeleteOutcome::Deleted(record) => Ok(OpOutcome::Applied(Applied {
            server_version: Some(record.version),
            persisted: true,
            snapshot: None,
        })),
        DeleteOutcome::AlreadyAbsent => Ok(OpOutcome::Applied(Applied {
            server_version: None,
            persisted: false,
            snapshot: None,
        })),
    }
}

fn apply_user(
    store: &dyn EntityStore,
    caller: &CallerContext,
    op: &SyncOperation,
) -> StoreResult<OpOutcome> {
    if op.op_type != OperationType::Update {
        return Ok(OpOutcome::Rejected(
            "Unsupported operation for user profile".to_string(),
        ));
    }
    if op.entity_id.as_str() != caller.user_id.as_str() {
        return Ok(OpOutcome::Rejected("Access denied".to_string()));
    }

    let changes = match update_changes(&op.payload) {
        Ok(changes) => changes,
        Err(err) => return Ok(OpOutcome::Rejected(format!("Invalid payload: {err}"))),
    };

    // No version gate: submitted profile fields overwrite unconditionally.
    match store.update_if_current(&caller.tenant_id, EntityKind::User, &op.entity_id, None, &changes)?
    {
        UpdateOutcome::Applied(record) => Ok(applied(&record, true)),
        UpdateOutcome::Stale(current) => Ok(OpOutcome::Conflicted(Conflict::update_conflict(
            op.payload.clone(),
            current.snapshot(),
        ))),
        UpdateOutcome::Missing => upsert_profile(store, caller, op),
    }
}

// First profile write from a device arrives as an update; create the
// record it assumes.
fn upsert_profile(
    store: &dyn EntityStore,
    caller: &CallerContext,
    op: &SyncOperation,
) -> StoreResult<OpOutcome> {
    let data = match normalize_create(EntityKind::User, &op.payload) {
        Ok(data) => data,
        Err(err) => return Ok(OpOutcome::Rejected(format!("Invalid payload: {err}"))),
    };

    match store.insert_new(&caller.tenant_id, EntityKind::User, &op.entity_id, data)? {
        InsertOutcome::Inserted(record) => Ok(applied(&record, true)),
        // Lost a race with another device of the same user; the
        // overwrite contract still holds, so merge into what won.
        InsertOutcome::Exists(_) => {
            let changes = match update_changes(&op.payload) {
                Ok(changes) => changes,
                Err(err) => return Ok(OpOutcome::Rejected(format!("Invalid payload: {err}"))),
            };
            match store.update_if_current(
                &caller.tenant_id,
                EntityKind::User,
                &op.entity_id,
                None,
                &changes,
            )? {
                UpdateOutcome::Applied(record) => Ok(applied(&record, true)),
                _ => Ok(OpOutcome::Rejected("Database operation failed".to_string())),
            }
        }
    }
}
