#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use notesync::{
    persist::{BatchOp, OpResult, RecordStore, Row, RowLocation, StoreError, StoreResult},
    types::{Collection, RecordId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Insert(Row),
    Update(RecordId, Row),
    Batch(Vec<BatchOp>),
}

/// Records every call and replays queued responses; falls back to
/// auto-assigned ids and full success once a queue runs dry.
#[derive(Default)]
pub struct ScriptedStore {
    calls: Arc<Mutex<Vec<Call>>>,
    inserts: VecDeque<StoreResult<Option<RowLocation>>>,
    updates: VecDeque<StoreResult<usize>>,
    batches: VecDeque<StoreResult<Vec<Option<OpResult>>>>,
    next_id: RecordId,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            next_id: 100,
            ..Self::default()
        }
    }

    pub fn calls_handle(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn push_insert(&mut self, res: StoreResult<Option<RowLocation>>) -> &mut Self {
        self.inserts.push_back(res);
        self
    }

    pub fn push_insert_location(&mut self, raw: &str) -> &mut Self {
        self.push_insert(Ok(Some(RowLocation(raw.to_string()))))
    }

    pub fn push_update(&mut self, res: StoreResult<usize>) -> &mut Self {
        self.updates.push_back(res);
        self
    }

    pub fn push_batch(&mut self, res: StoreResult<Vec<Option<OpResult>>>) -> &mut Self {
        self.batches.push_back(res);
        self
    }
}

impl RecordStore for ScriptedStore {
    fn insert(&mut self, row: &Row) -> StoreResult<Option<RowLocation>> {
        self.calls.lock().expect("lock").push(Call::Insert(row.clone()));
        self.inserts.pop_front().unwrap_or_else(|| {
            self.next_id += 1;
            Ok(Some(RowLocation::new(row.collection(), self.next_id)))
        })
    }

    fn update(&mut self, id: RecordId, row: &Row) -> StoreResult<usize> {
        self.calls
            .lock()
            .expect("lock")
            .push(Call::Update(id, row.clone()));
        self.updates.pop_front().unwrap_or(Ok(1))
    }

    fn submit_batch(&mut self, ops: &[BatchOp]) -> StoreResult<Vec<Option<OpResult>>> {
        self.calls
            .lock()
            .expect("lock")
            .push(Call::Batch(ops.to_vec()));
        self.batches.pop_front().unwrap_or_else(|| {
            Ok(ops
                .iter()
                .map(|_| Some(OpResult { rows_affected: 1 }))
                .collect())
        })
    }
}

pub fn remote_error(msg: &str) -> StoreError {
    StoreError::Remote(msg.to_string())
}

pub fn location(collection: Collection, id: RecordId) -> RowLocation {
    RowLocation::new(collection, id)
}
