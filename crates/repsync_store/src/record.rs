//! Versioned record representation.

use chrono::{DateTime, Utc};
use repsync_protocol::{EntityId, EntityKind, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A stored, versioned entity record.
///
/// Records are never physically removed by the sync path: a delete
/// sets `deleted` and bumps `version` like any other accepted write.
/// `version` starts at 1 on create and increments by exactly 1 per
/// accepted mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Record id (client-assigned).
    pub id: EntityId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity fields as a JSON object.
    pub data: Value,
    /// Monotonic record version.
    pub version: u64,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Last mutation time, server clock.
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Creates a fresh record at version 1.
    pub fn new(
        id: EntityId,
        tenant_id: TenantId,
        kind: EntityKind,
        data: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            kind,
            data,
            version: 1,
            deleted: false,
            updated_at: now,
        }
    }

    /// Merges field-level changes into `data`.
    ///
    /// Only submitted keys are touched; everything else keeps its
    /// stored value. Does not bump `version` — the store does that as
    /// part of the conditional write.
    pub fn merge_changes(&mut self, changes: &Map<String, Value>) {
        if let Some(fields) = self.data.as_object_mut() {
            for (key, value) in changes {
                fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Snapshot for conflict reports and the change log.
    ///
    /// The record's fields plus `version`, `deleted`, and `updatedAt`,
    /// so a client can reconcile without a follow-up fetch.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let mut fields = self.data.as_object().cloned().unwrap_or_default();
        fields.insert("version".to_string(), json!(self.version));
        fields.insert("deleted".to_string(), json!(self.deleted));
        fields.insert("updatedAt".to_string(), json!(self.updated_at.to_rfc3339()));
        Value::Object(fields)
    }
}
