//! In-memory entity store.

use crate::error::StoreResult;
use crate::record::StoredRecord;
use crate::store::{DeleteOutcome, EntityStore, InsertOutcome, UpdateOutcome};
use chrono::Utc;
use parking_lot::RwLock;
use repsync_protocol::{EntityId, EntityKind, TenantId};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    tenant: TenantId,
    kind: EntityKind,
    id: EntityId,
}

impl RecordKey {
    fn new(tenant: &TenantId, kind: EntityKind, id: &EntityId) -> Self {
        Self {
            tenant: tenant.clone(),
            kind,
            id: id.clone(),
        }
    }
}

/// An in-memory [`EntityStore`].
///
/// Every mutation takes the write lock for its whole read-modify-write
/// span, which is what makes the conditional operations atomic.
pub struct MemoryStore {
    records: RwLock<HashMap<RecordKey, StoredRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for MemoryStore {
    fn get(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        id: &EntityId,
    ) -> StoreResult<Option<StoredRecord>> {
        let key = RecordKey::new(tenant, kind, id);
        Ok(self.records.read().get(&key).cloned())
    }

    fn insert_new(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        id: &EntityId,
        data: Value,
    ) -> StoreResult<InsertOutcome> {
        let key = RecordKey::new(tenant, kind, id);
        let mut records = self.records.write();

        if let Some(existing) = records.get(&key) {
            return Ok(InsertOutcome::Exists(existing.clone()));
        }

        let record = StoredRecord::new(id.clone(), tenant.clone(), kind, data, Utc::now());
        records.insert(key, record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    fn update_if_current(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        id: &EntityId,
        expected: Option<u64>,
        changes: &Map<String, Value>,
    ) -> StoreResult<UpdateOutcome> {
        let key = RecordKey::new(tenant, kind, id);
        let mut records = self.records.write();

        let Some(record) = records.get_mut(&key) else {
            return Ok(UpdateOutcome::Missing);
        };

        if let Some(observed) = expected {
            if observed < record.version {
                return Ok(UpdateOutcome::Stale(record.clone()));
            }
        }

        record.merge_changes(changes);
        record.version += 1;
        record.updated_at = Utc::now();
        Ok(UpdateOutcome::Applied(record.clone()))
    }

    fn mark_deleted(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        id: &EntityId,
    ) -> StoreResult<DeleteOutcome> {
        let key = RecordKey::new(tenant, kind, id);
        let mut records = self.records.write();

        let Some(record) = records.get_mut(&key) else {
            return Ok(DeleteOutcome::AlreadyAbsent);
        };

        record.deleted = true;
        record.version += 1;
        record.updated_at = Utc::now();
        Ok(DeleteOutcome::Deleted(record.clone()))
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn tenant() -> TenantId {
        TenantId::new("t1")
    }

    fn changes(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn insert_starts_at_version_one() {
        let store = MemoryStore::new();
        let outcome = store
            .insert_new(
                &tenant(),
                EntityKind::Workout,
                &EntityId::new("w1"),
                json!({"name": "Leg Day"}),
            )
            .unwrap();

        match outcome {
            InsertOutcome::Inserted(record) => {
                assert_eq!(record.version, 1);
                assert!(!record.deleted);
            }
            InsertOutcome::Exists(_) => panic!("expected insert"),
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_insert_leaves_record_unchanged() {
        let store = MemoryStore::new();
        let id = EntityId::new("w1");
        store
            .insert_new(&tenant(), EntityKind::Workout, &id, json!({"name": "a"}))
            .unwrap();

        let outcome = store
            .insert_new(&tenant(), EntityKind::Workout, &id, json!({"name": "b"}))
            .unwrap();

        match outcome {
            InsertOutcome::Exists(existing) => assert_eq!(existing.data["name"], "a"),
            InsertOutcome::Inserted(_) => panic!("expected existing record"),
        }

        let stored = store.get(&tenant(), EntityKind::Workout, &id).unwrap().unwrap();
        assert_eq!(stored.data["name"], "a");
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn stale_update_is_rejected() {
        let store = MemoryStore::new();
        let id = EntityId::new("s1");
        store
            .insert_new(&tenant(), EntityKind::Set, &id, json!({"reps": 8}))
            .unwrap();
        store
            .update_if_current(&tenant(), EntityKind::Set, &id, None, &changes(json!({"reps": 9})))
            .unwrap();

        // Stored version is now 2; a client that observed 1 is stale.
        let outcome = store
            .update_if_current(
                &tenant(),
                EntityKind::Set,
                &id,
                Some(1),
                &changes(json!({"reps": 10})),
            )
            .unwrap();

        match outcome {
            UpdateOutcome::Stale(current) => {
                assert_eq!(current.version, 2);
                assert_eq!(current.data["reps"], 9);
            }
            _ => panic!("expected stale"),
        }
    }

    #[test]
    fn current_update_increments_by_one() {
        let store = MemoryStore::new();
        let id = EntityId::new("s1");
        store
            .insert_new(&tenant(), EntityKind::Set, &id, json!({"reps": 8}))
            .unwrap();

        let outcome = store
            .update_if_current(
                &tenant(),
                EntityKind::Set,
                &id,
                Some(1),
                &changes(json!({"reps": 12})),
            )
            .unwrap();

        match outcome {
            UpdateOutcome::Applied(record) => {
                assert_eq!(record.version, 2);
                assert_eq!(record.data["reps"], 12);
            }
            _ => panic!("expected applied"),
        }
    }

    #[test]
    fn update_of_missing_record() {
        let store = MemoryStore::new();
        let outcome = store
            .update_if_current(
                &tenant(),
                EntityKind::Set,
                &EntityId::new("nope"),
                None,
                &changes(json!({"reps": 1})),
            )
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Missing));
    }

    #[test]
    fn delete_is_soft_and_idempotent() {
        let store = MemoryStore::new();
        let id = EntityId::new("w1");

        assert!(matches!(
            store.mark_deleted(&tenant(), EntityKind::Workout, &id).unwrap(),
            DeleteOutcome::AlreadyAbsent
        ));

        store
            .insert_new(&tenant(), EntityKind::Workout, &id, json!({"name": "a"}))
            .unwrap();

        match store.mark_deleted(&tenant(), EntityKind::Workout, &id).unwrap() {
            DeleteOutcome::Deleted(record) => {
                assert!(record.deleted);
                assert_eq!(record.version, 2);
            }
            DeleteOutcome::AlreadyAbsent => panic!("expected delete"),
        }

        // Record survives as a tombstone.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn tenants_do_not_collide() {
        let store = MemoryStore::new();
        let id = EntityId::new("w1");
        let other = TenantId::new("t2");

        store
            .insert_new(&tenant(), EntityKind::Workout, &id, json!({"name": "a"}))
            .unwrap();
        let outcome = store
            .insert_new(&other, EntityKind::Workout, &id, json!({"name": "b"}))
            .unwrap();

        assert!(matches!(outcome, InsertOutcome::Inserted(_)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_updates_cannot_both_pass_the_same_check() {
        let store = Arc::new(MemoryStore::new());
        let id = EntityId::new("s1");
        store
            .insert_new(&tenant(), EntityKind::Set, &id, json!({"reps": 8}))
            .unwrap();

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let store = Arc::clone(&store);
                let id = id.clone();
                thread::spawn(move || {
                    store
                        .update_if_current(
                            &TenantId::new("t1"),
                            EntityKind::Set,
                            &id,
                            Some(1),
                            &changes(json!({"reps": 10 + i})),
                        )
                        .unwrap()
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let applied = outcomes
            .iter()
            .filter(|o| matches!(o, UpdateOutcome::Applied(_)))
            .count();
        let stale = outcomes
            .iter()
            .filter(|o| matches!(o, UpdateOutcome::Stale(_)))
            .count();

        assert_eq!(applied, 1);
        assert_eq!(stale, 1);

        let stored = store.get(&tenant(), EntityKind::Set, &id).unwrap().unwrap();
        assert_eq!(stored.version, 2);
    }
}
