//! Persistence seam for detail records.
//!
//! The session only ever calls [`RecordStore::update`]; fetching is done by whoever
//! opens the session (see `SessionLoader`).

mod memory;

pub use memory::InMemoryRecordStore;

use crate::core::{CycleId, OrgId, Record, RecordId, RecordState, Result};
use crate::kind::RecordKind;
use async_trait::async_trait;
use serde::Serialize;

/// Payload of a save: the record's identity and its full edited state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRequest {
    #[serde(skip)]
    pub kind: RecordKind,
    pub id: RecordId,
    pub cycle_id: CycleId,
    pub organization_id: OrgId,
    pub state: RecordState,
}

impl UpdateRequest {
    pub fn for_record(kind: RecordKind, record: &Record) -> Self {
        Self {
            kind,
            id: record.id,
            cycle_id: record.cycle.id,
            organization_id: record.organization_id,
            state: record.state.clone(),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch(&self, kind: &RecordKind, id: RecordId, cycle_id: CycleId) -> Result<Record>;

    /// Persists `request.state`; returns the record as stored.
    async fn update(&self, request: UpdateRequest) -> Result<Record>;
}
