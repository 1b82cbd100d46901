//! Sub-record buffers and the flush algorithm that reconciles them with the
//! store.
//!
//! Each note carries at most one text and one call sub-record. A buffer whose
//! identity is still unset is written with a direct insert; a buffer that
//! already has an identity is queued as an update, and all queued updates go
//! out as a single batch once both buffers have been visited.

use tracing::{debug, warn};

use crate::{
    error::{IdentityError, NoteError, NoteResult, ensure_positive},
    persist::{BatchOp, RecordStore, Row},
    record::{CallField, DataPatch, TextField},
    types::{ContentKind, RecordId, TimestampMs, now_ms},
};

/// Parent-dirtying side effect of a buffer edit, applied by the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the owning note stays clean unless the stamp is applied"]
pub struct DirtyStamp {
    /// Modification time to record on the note row.
    pub modified_date: TimestampMs,
}

/// Pending changes and identity for one payload kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRecordBuffer {
    kind: ContentKind,
    id: Option<RecordId>,
    fields: DataPatch,
}

impl SubRecordBuffer {
    fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            id: None,
            fields: DataPatch::default(),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Store identity, `None` until the first insert lands.
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn fields(&self) -> &DataPatch {
        &self.fields
    }

    pub fn is_dirty(&self) -> bool {
        !self.fields.is_empty()
    }

    fn set_id(&mut self, id: RecordId) -> NoteResult<()> {
        let what = match self.kind {
            ContentKind::Text => "text data",
            ContentKind::Call => "call data",
        };
        self.id = Some(ensure_positive(what, id)?);
        Ok(())
    }

    /// Consumes pending fields into a write. Returns the deferred update when
    /// the buffer already has an identity; inserts directly otherwise.
    fn drain_into<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        note_id: RecordId,
    ) -> NoteResult<Option<BatchOp>> {
        self.fields.note_id = Some(note_id);
        let mut fields = std::mem::take(&mut self.fields);

        match self.id {
            Some(id) => Ok(Some(BatchOp::Update {
                id,
                row: Row::Data(fields),
            })),
            None => {
                fields.content_kind = Some(self.kind);
                let location = store.insert(&Row::Data(fields))?;
                let id = location.ok_or(IdentityError::Missing)?.record_id()?;
                debug!(note_id, id, kind = self.kind.as_str(), "inserted sub-record");
                self.id = Some(id);
                Ok(None)
            }
        }
    }
}

/// Text and call buffers of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteData {
    text: SubRecordBuffer,
    call: SubRecordBuffer,
}

impl Default for NoteData {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteData {
    pub fn new() -> Self {
        Self {
            text: SubRecordBuffer::new(ContentKind::Text),
            call: SubRecordBuffer::new(ContentKind::Call),
        }
    }

    pub fn text(&self) -> &SubRecordBuffer {
        &self.text
    }

    pub fn call(&self) -> &SubRecordBuffer {
        &self.call
    }

    pub fn is_dirty(&self) -> bool {
        self.text.is_dirty() || self.call.is_dirty()
    }

    pub(crate) fn set_text_field(&mut self, field: TextField) -> DirtyStamp {
        self.text.fields.set_text(field);
        DirtyStamp {
            modified_date: now_ms(),
        }
    }

    pub(crate) fn set_call_field(&mut self, field: CallField) -> DirtyStamp {
        self.call.fields.set_call(field);
        DirtyStamp {
            modified_date: now_ms(),
        }
    }

    pub fn set_text_id(&mut self, id: RecordId) -> NoteResult<()> {
        self.text.set_id(id)
    }

    pub fn set_call_id(&mut self, id: RecordId) -> NoteResult<()> {
        self.call.set_id(id)
    }

    /// Writes pending sub-record changes for `note_id`.
    ///
    /// Text is processed before call. A failed insert aborts immediately and
    /// leaves any unvisited buffer untouched. Fields of a visited buffer are
    /// gone whether or not its write succeeded, so on error the caller cannot
    /// tell which sub-records persisted and should retry the whole note.
    pub fn flush<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        note_id: RecordId,
    ) -> NoteResult<()> {
        ensure_positive("note", note_id)?;

        let mut batch = Vec::with_capacity(2);
        for buffer in [&mut self.text, &mut self.call] {
            if !buffer.is_dirty() {
                continue;
            }
            if let Some(op) = buffer.drain_into(store, note_id)? {
                batch.push(op);
            }
        }

        if batch.is_empty() {
            return Ok(());
        }

        let results = store.submit_batch(&batch).inspect_err(|err| {
            warn!(note_id, ops = batch.len(), error = %err, "sub-record batch failed");
        })?;
        match results.first() {
            Some(Some(_)) => {
                debug!(note_id, ops = batch.len(), "sub-record batch applied");
                Ok(())
            }
            _ => Err(NoteError::BatchRejected(format!(
                "no result for first of {} ops on note {note_id}",
                batch.len()
            ))),
        }
    }
}
