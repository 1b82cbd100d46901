//! Shared primitive IDs and note-related enums.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Store-assigned row identifier. Valid identities are strictly positive.
pub type RecordId = i64;
/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// Backing-store collection a row lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    /// Top-level note and folder rows.
    Notes,
    /// Sub-record payload rows attached to a note.
    Data,
}

impl Collection {
    /// Path segment used in [`crate::persist::RowLocation`] values.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notes => "note",
            Self::Data => "data",
        }
    }
}

/// Discriminator for top-level rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NoteType {
    /// Plain note.
    #[default]
    Note,
    /// User folder.
    Folder,
    /// System folder (root, trash, call records).
    System,
}

impl NoteType {
    /// Integer code stored in the `note_type` column.
    pub fn code(self) -> i64 {
        match self {
            Self::Note => 0,
            Self::Folder => 1,
            Self::System => 2,
        }
    }

    /// Inverse of [`NoteType::code`].
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Note),
            1 => Some(Self::Folder),
            2 => Some(Self::System),
            _ => None,
        }
    }
}

/// Payload kind of a sub-record, stamped on first insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Free-text body.
    Text,
    /// Call-log metadata.
    Call,
}

impl ContentKind {
    /// Value stored in the `content_kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text_note",
            Self::Call => "call_note",
        }
    }

    /// Inverse of [`ContentKind::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text_note" => Some(Self::Text),
            "call_note" => Some(Self::Call),
            _ => None,
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> TimestampMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as TimestampMs)
        .unwrap_or(0)
}
