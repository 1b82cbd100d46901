//! In-process record store backed by hash maps.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    record::{DataRow, NoteRow},
    types::{Collection, RecordId},
};

use super::{BatchOp, OpResult, RecordStore, Row, RowLocation, StoreError, StoreResult};

const SNAPSHOT_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshotV1 {
    pub next_note_id: RecordId,
    pub next_data_id: RecordId,
    pub notes: Vec<NoteRow>,
    pub data: Vec<DataRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotEnvelope {
    format_version: u16,
    snapshot: MemorySnapshotV1,
}

/// [`RecordStore`] keeping materialized rows in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    notes: HashMap<RecordId, NoteRow>,
    data: HashMap<RecordId, DataRow>,
    next_note_id: RecordId,
    next_data_id: RecordId,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            next_note_id: 1,
            next_data_id: 1,
            ..Self::default()
        }
    }

    pub fn from_snapshot(snapshot: MemorySnapshotV1) -> Self {
        let mut store = Self {
            next_note_id: snapshot.next_note_id,
            next_data_id: snapshot.next_data_id,
            ..Self::default()
        };
        for row in snapshot.notes {
            store.next_note_id = store.next_note_id.max(row.id.saturating_add(1));
            store.notes.insert(row.id, row);
        }
        for row in snapshot.data {
            store.next_data_id = store.next_data_id.max(row.id.saturating_add(1));
            store.data.insert(row.id, row);
        }
        store
    }

    /// Exports all rows ordered by id.
    pub fn export_snapshot(&self) -> MemorySnapshotV1 {
        let mut notes: Vec<NoteRow> = self.notes.values().cloned().collect();
        notes.sort_by_key(|r| r.id);
        let mut data: Vec<DataRow> = self.data.values().cloned().collect();
        data.sort_by_key(|r| r.id);

        MemorySnapshotV1 {
            next_note_id: self.next_note_id,
            next_data_id: self.next_data_id,
            notes,
            data,
        }
    }

    pub fn snapshot_to_json(&self) -> StoreResult<Vec<u8>> {
        let env = SnapshotEnvelope {
            format_version: SNAPSHOT_FORMAT_VERSION,
            snapshot: self.export_snapshot(),
        };
        Ok(serde_json::to_vec(&env)?)
    }

    pub fn snapshot_from_json(payload: &[u8]) -> StoreResult<Self> {
        let env: SnapshotEnvelope = serde_json::from_slice(payload)?;
        if env.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(StoreError::Message(format!(
                "unsupported snapshot format: {}",
                env.format_version
            )));
        }
        Ok(Self::from_snapshot(env.snapshot))
    }

    pub fn note(&self, id: RecordId) -> Option<&NoteRow> {
        self.notes.get(&id)
    }

    pub fn data(&self, id: RecordId) -> Option<&DataRow> {
        self.data.get(&id)
    }

    /// Sub-records owned by `note_id`, ordered by id.
    pub fn data_for_note(&self, note_id: RecordId) -> Vec<&DataRow> {
        let mut rows: Vec<&DataRow> = self
            .data
            .values()
            .filter(|r| r.note_id == note_id)
            .collect();
        rows.sort_by_key(|r| r.id);
        rows
    }

    fn apply_update(&mut self, id: RecordId, row: &Row) -> usize {
        match row {
            Row::Note(patch) => match self.notes.get_mut(&id) {
                Some(rec) => {
                    patch.apply_to(rec);
                    1
                }
                None => 0,
            },
            Row::Data(patch) => match self.data.get_mut(&id) {
                Some(rec) => {
                    patch.apply_to(rec);
                    1
                }
                None => 0,
            },
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert(&mut self, row: &Row) -> StoreResult<Option<RowLocation>> {
        let (collection, id) = match row {
            Row::Note(patch) => {
                let id = self.next_note_id;
                self.next_note_id += 1;
                self.notes.insert(id, NoteRow::from_patch(id, patch));
                (Collection::Notes, id)
            }
            Row::Data(patch) => {
                let id = self.next_data_id;
                self.next_data_id += 1;
                self.data.insert(id, DataRow::from_patch(id, patch));
                (Collection::Data, id)
            }
        };
        debug!(collection = collection.as_str(), id, "memory insert");
        Ok(Some(RowLocation::new(collection, id)))
    }

    fn update(&mut self, id: RecordId, row: &Row) -> StoreResult<usize> {
        Ok(self.apply_update(id, row))
    }

    fn submit_batch(&mut self, ops: &[BatchOp]) -> StoreResult<Vec<Option<OpResult>>> {
        // A missing target is a zero-row result, not a failure.
        let results = ops
            .iter()
            .map(|op| {
                let BatchOp::Update { id, row } = op;
                Some(OpResult {
                    rows_affected: self.apply_update(*id, row),
                })
            })
            .collect();
        Ok(results)
    }
}
