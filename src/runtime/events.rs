//! Runtime event stream payloads.

use crate::types::RecordId;

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    /// A new note row was created.
    Allocated {
        /// Allocated note id.
        id: RecordId,
    },
    /// All pending changes of a note were written.
    Synced {
        /// Synced note id.
        note_id: RecordId,
    },
    /// A sub-record write failed; the caller should retry the note.
    SyncFailed {
        /// Affected note id.
        note_id: RecordId,
    },
}
