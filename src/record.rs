//! Note and sub-record rows, typed fields, and sparse patches.

use serde::{Deserialize, Serialize};

use crate::types::{ContentKind, NoteType, RecordId, TimestampMs};

/// Fully materialized top-level note row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    /// Stable row identifier.
    pub id: RecordId,
    /// Folder containing this note.
    pub parent_id: RecordId,
    /// Creation time.
    pub created_date: TimestampMs,
    /// Last local modification time.
    pub modified_date: TimestampMs,
    /// Row discriminator.
    pub note_type: NoteType,
    /// True when the row has changes not yet seen by a remote sync.
    pub local_modified: bool,
    /// Short preview of the note body.
    pub snippet: String,
    /// Reminder time, zero when unset.
    pub alert_date: TimestampMs,
    /// Background color index.
    pub bg_color_id: i32,
    /// Home-screen widget bound to this note, zero when none.
    pub widget_id: i64,
    /// Widget layout kind, negative when none.
    pub widget_type: i32,
}

impl NoteRow {
    /// Materializes a row from an insert patch, defaulting unset columns.
    pub fn from_patch(id: RecordId, patch: &NotePatch) -> Self {
        let mut row = Self {
            id,
            parent_id: 0,
            created_date: 0,
            modified_date: 0,
            note_type: NoteType::Note,
            local_modified: false,
            snippet: String::new(),
            alert_date: 0,
            bg_color_id: 0,
            widget_id: 0,
            widget_type: -1,
        };
        patch.apply_to(&mut row);
        row
    }
}

/// Directly settable top-level note fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteField {
    /// Move to another folder.
    ParentId(RecordId),
    /// Reminder time.
    AlertDate(TimestampMs),
    /// Background color index.
    BgColorId(i32),
    /// Preview text.
    Snippet(String),
    /// Bound widget id.
    WidgetId(i64),
    /// Bound widget layout.
    WidgetType(i32),
    /// Row discriminator.
    Type(NoteType),
}

/// Sparse note patch where each `Some` field overwrites the row value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotePatch {
    /// Optional replacement for parent folder.
    pub parent_id: Option<RecordId>,
    /// Optional replacement for creation time.
    pub created_date: Option<TimestampMs>,
    /// Optional replacement for modification time.
    pub modified_date: Option<TimestampMs>,
    /// Optional replacement for row type.
    pub note_type: Option<NoteType>,
    /// Optional replacement for local-modified flag.
    pub local_modified: Option<bool>,
    /// Optional replacement for snippet.
    pub snippet: Option<String>,
    /// Optional replacement for alert time.
    pub alert_date: Option<TimestampMs>,
    /// Optional replacement for background color.
    pub bg_color_id: Option<i32>,
    /// Optional replacement for widget id.
    pub widget_id: Option<i64>,
    /// Optional replacement for widget layout.
    pub widget_type: Option<i32>,
}

impl NotePatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges one typed field into the patch.
    pub fn set(&mut self, field: NoteField) {
        match field {
            NoteField::ParentId(v) => self.parent_id = Some(v),
            NoteField::AlertDate(v) => self.alert_date = Some(v),
            NoteField::BgColorId(v) => self.bg_color_id = Some(v),
            NoteField::Snippet(v) => self.snippet = Some(v),
            NoteField::WidgetId(v) => self.widget_id = Some(v),
            NoteField::WidgetType(v) => self.widget_type = Some(v),
            NoteField::Type(v) => self.note_type = Some(v),
        }
    }

    /// Stamps the local-modified flag and modification time.
    pub fn mark_modified(&mut self, at: TimestampMs) {
        self.local_modified = Some(true);
        self.modified_date = Some(at);
    }

    /// Applies this patch in place to `row`.
    pub fn apply_to(&self, row: &mut NoteRow) {
        if let Some(v) = self.parent_id {
            row.parent_id = v;
        }
        if let Some(v) = self.created_date {
            row.created_date = v;
        }
        if let Some(v) = self.modified_date {
            row.modified_date = v;
        }
        if let Some(v) = self.note_type {
            row.note_type = v;
        }
        if let Some(v) = self.local_modified {
            row.local_modified = v;
        }
        if let Some(v) = &self.snippet {
            row.snippet = v.clone();
        }
        if let Some(v) = self.alert_date {
            row.alert_date = v;
        }
        if let Some(v) = self.bg_color_id {
            row.bg_color_id = v;
        }
        if let Some(v) = self.widget_id {
            row.widget_id = v;
        }
        if let Some(v) = self.widget_type {
            row.widget_type = v;
        }
    }
}

/// Fully materialized sub-record row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRow {
    /// Stable row identifier.
    pub id: RecordId,
    /// Owning note.
    pub note_id: RecordId,
    /// Payload kind; unset only for rows written by foreign code.
    pub content_kind: Option<ContentKind>,
    /// Text body, or the call note's free text.
    pub content: String,
    /// Text payload: checklist rendering.
    pub checklist_mode: bool,
    /// Call payload: call time.
    pub call_date: Option<TimestampMs>,
    /// Call payload: remote party number.
    pub phone_number: Option<String>,
}

impl DataRow {
    /// Materializes a row from an insert patch, defaulting unset columns.
    pub fn from_patch(id: RecordId, patch: &DataPatch) -> Self {
        let mut row = Self {
            id,
            note_id: 0,
            content_kind: None,
            content: String::new(),
            checklist_mode: false,
            call_date: None,
            phone_number: None,
        };
        patch.apply_to(&mut row);
        row
    }
}

/// Settable fields of the text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextField {
    /// Note body.
    Content(String),
    /// Render the body as a checklist.
    ChecklistMode(bool),
}

/// Settable fields of the call payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallField {
    /// Free text attached to the call.
    Content(String),
    /// Time of the call.
    CallDate(TimestampMs),
    /// Remote party number.
    PhoneNumber(String),
}

/// Sparse sub-record patch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataPatch {
    /// Foreign key to the owning note.
    pub note_id: Option<RecordId>,
    /// Payload discriminator, stamped on first insert only.
    pub content_kind: Option<ContentKind>,
    /// Optional replacement for content.
    pub content: Option<String>,
    /// Optional replacement for checklist mode.
    pub checklist_mode: Option<bool>,
    /// Optional replacement for call time.
    pub call_date: Option<TimestampMs>,
    /// Optional replacement for phone number.
    pub phone_number: Option<String>,
}

impl DataPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges one text field into the patch.
    pub fn set_text(&mut self, field: TextField) {
        match field {
            TextField::Content(v) => self.content = Some(v),
            TextField::ChecklistMode(v) => self.checklist_mode = Some(v),
        }
    }

    /// Merges one call field into the patch.
    pub fn set_call(&mut self, field: CallField) {
        match field {
            CallField::Content(v) => self.content = Some(v),
            CallField::CallDate(v) => self.call_date = Some(v),
            CallField::PhoneNumber(v) => self.phone_number = Some(v),
        }
    }

    /// Applies this patch in place to `row`.
    pub fn apply_to(&self, row: &mut DataRow) {
        if let Some(v) = self.note_id {
            row.note_id = v;
        }
        if let Some(v) = self.content_kind {
            row.content_kind = Some(v);
        }
        if let Some(v) = &self.content {
            row.content = v.clone();
        }
        if let Some(v) = self.checklist_mode {
            row.checklist_mode = v;
        }
        if let Some(v) = self.call_date {
            row.call_date = Some(v);
        }
        if let Some(v) = &self.phone_number {
            row.phone_number = Some(v.clone());
        }
    }
}
