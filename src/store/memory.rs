use super::{RecordStore, UpdateRequest};
use crate::core::{CycleId, DetailError, Record, RecordId, Result};
use crate::kind::RecordKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StoreKey {
    item_type: &'static str,
    id: RecordId,
    cycle_id: CycleId,
}

impl StoreKey {
    fn new(kind: &RecordKind, id: RecordId, cycle_id: CycleId) -> Self {
        Self {
            item_type: kind.item_type,
            id,
            cycle_id,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredRecord {
    record: Record,
    version: u64,
    updated_at: DateTime<Utc>,
}

/// Record store held in process memory.
///
/// Backs the CLI and tests. Updates replace the whole state and bump a version.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<StoreKey, StoredRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, kind: &RecordKind, record: Record) {
        let key = StoreKey::new(kind, record.id, record.cycle.id);
        let stored = StoredRecord {
            record,
            version: 0,
            updated_at: Utc::now(),
        };
        self.records.write().await.insert(key, stored);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of successful updates applied to the record.
    pub async fn version(
        &self,
        kind: &RecordKind,
        id: RecordId,
        cycle_id: CycleId,
    ) -> Option<u64> {
        self.records
            .read()
            .await
            .get(&StoreKey::new(kind, id, cycle_id))
            .map(|stored| stored.version)
    }

    pub async fn updated_at(
        &self,
        kind: &RecordKind,
        id: RecordId,
        cycle_id: CycleId,
    ) -> Option<DateTime<Utc>> {
        self.records
            .read()
            .await
            .get(&StoreKey::new(kind, id, cycle_id))
            .map(|stored| stored.updated_at)
    }
}

fn not_found(kind: &RecordKind, id: RecordId, cycle_id: CycleId) -> DetailError {
    DetailError::NotFound {
        kind: kind.item_type.to_string(),
        id: id.0,
        cycle_id: cycle_id.0,
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch(&self, kind: &RecordKind, id: RecordId, cycle_id: CycleId) -> Result<Record> {
        self.records
            .read()
            .await
            .get(&StoreKey::new(kind, id, cycle_id))
            .map(|stored| stored.record.clone())
            .ok_or_else(|| not_found(kind, id, cycle_id))
    }

    async fn update(&self, request: UpdateRequest) -> Result<Record> {
        let key = StoreKey::new(&request.kind, request.id, request.cycle_id);
        let mut records = self.records.write().await;
        let stored = records
            .get_mut(&key)
            .ok_or_else(|| not_found(&request.kind, request.id, request.cycle_id))?;

        let path = request.kind.detail_path(request.id.0, request.cycle_id.0);
        if stored.record.organization_id != request.organization_id {
            return Err(DetailError::StoreRejected(format!(
                "PUT {path}: record belongs to organization {}, not {}",
                stored.record.organization_id, request.organization_id
            )));
        }

        stored.record.state = request.state;
        stored.version += 1;
        stored.updated_at = Utc::now();
        event!(
            Level::DEBUG,
            %path,
            version = stored.version,
            "record state replaced"
        );
        Ok(stored.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cycle, OrgId, RecordState};
    use serde_json::json;

    fn record() -> Record {
        Record::new(
            1,
            Cycle::new(9),
            4,
            RecordState::from_json(json!({"address_line_1": "123 Main"})).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_fetch_and_update() {
        let store = InMemoryRecordStore::new();
        store.insert(&RecordKind::TAX_LOT, record()).await;

        let mut request = UpdateRequest::for_record(RecordKind::TAX_LOT, &record());
        request.state.set("address_line_1", json!("456 Oak"));
        let saved = store.update(request).await.unwrap();
        assert_eq!(saved.state.get("address_line_1"), Some(&json!("456 Oak")));

        let fetched = store
            .fetch(&RecordKind::TAX_LOT, RecordId(1), CycleId(9))
            .await
            .unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(
            store.version(&RecordKind::TAX_LOT, RecordId(1), CycleId(9)).await,
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_kinds_do_not_collide() {
        let store = InMemoryRecordStore::new();
        store.insert(&RecordKind::TAX_LOT, record()).await;
        let err = store
            .fetch(&RecordKind::PROPERTY, RecordId(1), CycleId(9))
            .await
            .unwrap_err();
        assert!(matches!(err, DetailError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_unknown_record() {
        let store = InMemoryRecordStore::new();
        let err = store
            .update(UpdateRequest::for_record(RecordKind::TAX_LOT, &record()))
            .await
            .unwrap_err();
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn test_update_rejects_foreign_organization() {
        let store = InMemoryRecordStore::new();
        store.insert(&RecordKind::TAX_LOT, record()).await;
        let mut request = UpdateRequest::for_record(RecordKind::TAX_LOT, &record());
        request.organization_id = OrgId(99);
        let err = store.update(request).await.unwrap_err();
        assert_eq!(
            err,
            DetailError::StoreRejected(
                "PUT /api/v2/taxlots/1/?cycle_id=9: record belongs to organization 4, not 99"
                    .to_string()
            )
        );
        assert_eq!(
            store.version(&RecordKind::TAX_LOT, RecordId(1), CycleId(9)).await,
            Some(0)
        );
    }
}
