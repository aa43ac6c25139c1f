//! Entity store trait definition.

use crate::error::StoreResult;
use crate::record::StoredRecord;
use repsync_protocol::{EntityId, EntityKind, TenantId};
use serde_json::{Map, Value};

/// Outcome of an insert-if-absent.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The record was created at version 1.
    Inserted(StoredRecord),
    /// A record with this id already exists; nothing was written.
    Exists(StoredRecord),
}

/// Outcome of a conditional update.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// The changes were applied and the version incremented by 1.
    Applied(StoredRecord),
    /// The expected version is older than the stored version; nothing
    /// was written. Carries the current record for conflict reporting.
    Stale(StoredRecord),
    /// No record with this id exists.
    Missing,
}

/// Outcome of a soft delete.
#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    /// The record was marked deleted and its version incremented.
    Deleted(StoredRecord),
    /// No record with this id exists; nothing was written.
    AlreadyAbsent,
}

/// Versioned entity storage.
///
/// This is the seam between the reconciler and the backing data
/// store. Records are keyed by `(tenant, kind, id)` — the same id in
/// two tenants names two unrelated records.
///
/// # Invariants
///
/// - Every conditional mutation is **atomic per call**: the version
///   check and the write happen inside one critical section, so two
///   concurrent writers can never both pass the same check.
/// - An accepted mutation increments `version` by exactly 1.
/// - `mark_deleted` never removes data; it sets the soft-delete flag.
///
/// # Implementors
///
/// - [`crate::MemoryStore`] — in-memory, for serving and testing
pub trait EntityStore: Send + Sync {
    /// Looks up a record, soft-deleted or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        id: &EntityId,
    ) -> StoreResult<Option<StoredRecord>>;

    /// Inserts a record at version 1 if the id is unused.
    ///
    /// If a record with this id already exists (in any soft-delete
    /// state), nothing is written and the existing record is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert_new(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        id: &EntityId,
        data: Value,
    ) -> StoreResult<InsertOutcome>;

    /// Applies field-level changes if the expected version is current.
    ///
    /// `expected` is the version the client last observed. The write
    /// is rejected as [`UpdateOutcome::Stale`] when `expected` is
    /// strictly less than the stored version; `None` applies
    /// unconditionally. An applied write merges `changes` into the
    /// record's data and increments `version` by 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn update_if_current(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        id: &EntityId,
        expected: Option<u64>,
        changes: &Map<String, Value>,
    ) -> StoreResult<UpdateOutcome>;

    /// Marks a record deleted and increments its version.
    ///
    /// Deleting an absent record is a no-op reported as
    /// [`DeleteOutcome::AlreadyAbsent`]. Deletes never conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn mark_deleted(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        id: &EntityId,
    ) -> StoreResult<DeleteOutcome>;

    /// Number of records held, soft-deleted included. Diagnostics only.
    fn len(&self) -> usize;

    /// Returns true if the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
