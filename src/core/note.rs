//! Note aggregate: identity allocation, top-level edits, and sync of the
//! note row together with its sub-records.

use std::sync::Mutex;

use tracing::{debug, error, warn};

use crate::{
    error::{IdentityError, NoteResult, ensure_positive},
    persist::{RecordStore, Row},
    record::{CallField, NoteField, NotePatch, TextField},
    types::{NoteType, RecordId, now_ms},
};

use super::data::{DirtyStamp, NoteData};

/// Serializes id allocation across every store and thread in the process.
static ALLOCATION_LOCK: Mutex<()> = Mutex::new(());

/// In-memory edit session for one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    diff: NotePatch,
    data: NoteData,
}

impl Note {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty note row in `folder_id` and returns its id.
    pub fn allocate_id<S: RecordStore + ?Sized>(
        store: &mut S,
        folder_id: RecordId,
    ) -> NoteResult<RecordId> {
        let _guard = ALLOCATION_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = now_ms();
        let row = NotePatch {
            parent_id: Some(folder_id),
            created_date: Some(now),
            modified_date: Some(now),
            note_type: Some(NoteType::Note),
            local_modified: Some(true),
            ..NotePatch::default()
        };

        let location = store.insert(&Row::Note(row))?.ok_or(IdentityError::Missing)?;
        let id = location.record_id().inspect_err(|err| {
            error!(folder_id, location = %location.0, error = %err, "note id allocation failed");
        })?;
        debug!(folder_id, id, "allocated note id");
        Ok(id)
    }

    pub fn set_field(&mut self, field: NoteField) {
        self.diff.set(field);
        self.diff.mark_modified(now_ms());
    }

    pub fn set_text_field(&mut self, field: TextField) {
        let stamp = self.data.set_text_field(field);
        self.apply_stamp(stamp);
    }

    pub fn set_call_field(&mut self, field: CallField) {
        let stamp = self.data.set_call_field(field);
        self.apply_stamp(stamp);
    }

    pub fn set_text_id(&mut self, id: RecordId) -> NoteResult<()> {
        self.data.set_text_id(id)
    }

    pub fn set_call_id(&mut self, id: RecordId) -> NoteResult<()> {
        self.data.set_call_id(id)
    }

    pub fn text_id(&self) -> Option<RecordId> {
        self.data.text().id()
    }

    pub fn call_id(&self) -> Option<RecordId> {
        self.data.call().id()
    }

    /// Pending top-level changes.
    pub fn diff(&self) -> &NotePatch {
        &self.diff
    }

    pub fn data(&self) -> &NoteData {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        !self.diff.is_empty() || self.data.is_dirty()
    }

    /// Persists pending changes to note `note_id`.
    ///
    /// The note row update is best effort: a miss or a store failure is logged
    /// and the sub-records are still written. `Ok(false)` means a sub-record
    /// write failed; the top-level diff has been dropped regardless.
    pub fn sync<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        note_id: RecordId,
    ) -> NoteResult<bool> {
        ensure_positive("note", note_id)?;

        if !self.is_dirty() {
            return Ok(true);
        }

        let diff = std::mem::take(&mut self.diff);
        if !diff.is_empty() {
            match store.update(note_id, &Row::Note(diff)) {
                Ok(0) => error!(note_id, "note update matched no rows"),
                Ok(_) => debug!(note_id, "note row updated"),
                Err(err) => warn!(note_id, error = %err, "note update failed"),
            }
        }

        if self.data.is_dirty() {
            if let Err(err) = self.data.flush(store, note_id) {
                warn!(note_id, error = %err, "sub-record flush failed");
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn apply_stamp(&mut self, stamp: DirtyStamp) {
        self.diff.mark_modified(stamp.modified_date);
    }
}
