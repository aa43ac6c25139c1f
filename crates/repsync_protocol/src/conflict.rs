//! Conflict reporting.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Why an operation could not be applied as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// A create targeted an id that already exists on the server.
    ConcurrentCreation,
    /// An update observed an older version than the server holds.
    UpdateConflict,
}

/// A detected conflict, returned to the client for resolution.
///
/// The server only detects and reports; the resolution policy (merge,
/// overwrite, prompt the user) is entirely the client's. Conflicts are
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Conflict category.
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    /// The payload the client submitted.
    pub local_data: Value,
    /// The server's current record state, including its `version`.
    pub server_data: Value,
}

impl Conflict {
    /// Creates a create-create conflict.
    pub fn concurrent_creation(local_data: Value, server_data: Value) -> Self {
        Self {
            kind: ConflictKind::ConcurrentCreation,
            local_data,
            server_data,
        }
    }

    /// Creates a stale-update conflict.
    pub fn update_conflict(local_data: Value, server_data: Value) -> Self {
        Self {
            kind: ConflictKind::UpdateConflict,
            local_data,
            server_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_wire_names() {
        let conflict = Conflict::concurrent_creation(json!({"name": "a"}), json!({"name": "b"}));
        let value = serde_json::to_value(&conflict).unwrap();

        assert_eq!(value["type"], "concurrent_creation");
        assert_eq!(value["localData"]["name"], "a");
        assert_eq!(value["serverData"]["name"], "b");
    }

    #[test]
    fn update_conflict_kind() {
        let conflict = Conflict::update_conflict(json!({}), json!({"version": 3}));
        assert_eq!(conflict.kind, ConflictKind::UpdateConflict);
        assert_eq!(conflict.server_data["version"], 3);
    }
}
