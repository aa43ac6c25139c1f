//! Sync operations.

use crate::ids::{EntityId, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Type of client-submitted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// A new record is being introduced.
    Create,
    /// Fields of an existing record are being changed.
    Update,
    /// A record is being soft-deleted.
    Delete,
}

impl OperationType {
    /// Returns the wire name of the operation type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Create => "create",
            OperationType::Update => "update",
            OperationType::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity a sync operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A planned workout session.
    Workout,
    /// An exercise within a workout.
    Exercise,
    /// A set within an exercise.
    Set,
    /// The caller's own profile.
    User,
}

impl EntityKind {
    /// Returns the wire name of the entity kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Workout => "workout",
            EntityKind::Exercise => "exercise",
            EntityKind::Set => "set",
            EntityKind::User => "user",
        }
    }

    /// Parses a wire name.
    ///
    /// Returns `None` for unknown names. Unknown kinds are a
    /// per-operation failure, so `SyncOperation::entity` stays a free
    /// string and is resolved through here at apply time.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "workout" => Some(EntityKind::Workout),
            "exercise" => Some(EntityKind::Exercise),
            "set" => Some(EntityKind::Set),
            "user" => Some(EntityKind::User),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single client-side mutation submitted for reconciliation.
///
/// Operations are generated offline, queued on the client, and pushed
/// in batches. They are not persisted on the server as-is; only their
/// effects are.
///
/// # Fields
///
/// - `id`: client-assigned operation id (used for client-side dedup)
/// - `op_type`: create, update, or delete
/// - `entity`: entity kind as submitted (free string on the wire)
/// - `entity_id`: the record being modified
/// - `payload`: entity fields; for updates it may carry `version`,
///   the version the client last observed
/// - `timestamp`: when the client performed the mutation locally
/// - `retry_count`: how often the client has retried this operation
/// - `tenant_id`: the tenant the client believes owns the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOperation {
    /// Client-assigned operation id.
    pub id: String,
    /// Operation type.
    #[serde(rename = "type")]
    pub op_type: OperationType,
    /// Entity kind as submitted.
    pub entity: String,
    /// Target record id.
    pub entity_id: EntityId,
    /// Entity fields. Deletes may omit it.
    #[serde(default)]
    pub payload: Value,
    /// Client-local mutation time.
    pub timestamp: DateTime<Utc>,
    /// Client retry counter.
    #[serde(default)]
    pub retry_count: u32,
    /// Tenant the operation claims to belong to.
    pub tenant_id: TenantId,
}

impl SyncOperation {
    /// Creates an operation with a minted id and the current time.
    pub fn new(
        op_type: OperationType,
        kind: EntityKind,
        entity_id: EntityId,
        payload: Value,
        tenant_id: TenantId,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            op_type,
            entity: kind.as_str().to_string(),
            entity_id,
            payload,
            timestamp: Utc::now(),
            retry_count: 0,
            tenant_id,
        }
    }

    /// Resolves the submitted entity name to a known kind.
    #[must_use]
    pub fn entity_kind(&self) -> Option<EntityKind> {
        EntityKind::parse(&self.entity)
    }
}
