mod support;

use notesync::{
    core::{data::NoteData, note::Note},
    error::NoteError,
    persist::{BatchOp, OpResult, Row},
    record::{CallField, DataPatch, NoteField, NotePatch, TextField},
    types::{ContentKind, now_ms},
};

use support::{Call, ScriptedStore, remote_error};

fn text(s: &str) -> TextField {
    TextField::Content(s.to_string())
}

#[test]
fn clean_sync_issues_no_store_calls() {
    let mut store = ScriptedStore::new();
    let mut note = Note::new();

    assert!(!note.is_dirty());
    assert!(note.sync(&mut store, 42).expect("sync"));
    assert!(store.calls().is_empty());
}

#[test]
fn first_text_edit_updates_note_then_inserts_sub_record() {
    let mut store = ScriptedStore::new();
    store.push_insert_location("note/42").push_insert_location("data/7");

    let note_id = Note::allocate_id(&mut store, 1).expect("allocate");
    assert_eq!(note_id, 42);

    let mut note = Note::new();
    note.set_text_field(text("hello"));
    assert!(note.is_dirty());

    assert!(note.sync(&mut store, note_id).expect("sync"));

    let calls = store.calls();
    assert_eq!(calls.len(), 3);

    let Call::Update(id, Row::Note(diff)) = &calls[1] else {
        panic!("expected note update, got {:?}", calls[1]);
    };
    assert_eq!(*id, 42);
    assert_eq!(diff.local_modified, Some(true));
    assert!(diff.modified_date.is_some());
    assert_eq!(
        NotePatch {
            local_modified: None,
            modified_date: None,
            ..diff.clone()
        },
        NotePatch::default()
    );

    assert_eq!(
        calls[2],
        Call::Insert(Row::Data(DataPatch {
            note_id: Some(42),
            content_kind: Some(ContentKind::Text),
            content: Some("hello".to_string()),
            ..DataPatch::default()
        }))
    );

    assert_eq!(note.text_id(), Some(7));
    assert!(note.diff().is_empty());
    assert!(!note.data().text().is_dirty());
    assert!(!note.is_dirty());
}

#[test]
fn second_text_edit_goes_through_batch_update() {
    let mut store = ScriptedStore::new();
    store.push_insert_location("data/7");

    let mut note = Note::new();
    note.set_text_field(text("hello"));
    assert!(note.sync(&mut store, 42).expect("first sync"));

    note.set_text_field(text("world"));
    assert!(note.sync(&mut store, 42).expect("second sync"));

    let calls = store.calls();
    let inserts = calls
        .iter()
        .filter(|c| matches!(c, Call::Insert(_)))
        .count();
    assert_eq!(inserts, 1);
    assert_eq!(
        calls.last(),
        Some(&Call::Batch(vec![BatchOp::Update {
            id: 7,
            row: Row::Data(DataPatch {
                note_id: Some(42),
                content: Some("world".to_string()),
                ..DataPatch::default()
            }),
        }]))
    );
    assert_eq!(note.text_id(), Some(7));
}

#[test]
fn batch_transport_failure_returns_false_and_loses_buffered_text() {
    let mut store = ScriptedStore::new();
    store.push_batch(Err(remote_error("connection reset")));

    let mut note = Note::new();
    note.set_text_id(7).expect("text id");
    note.set_text_field(text("world"));

    assert!(!note.sync(&mut store, 42).expect("sync"));
    assert!(note.data().text().fields().is_empty());
    assert!(note.diff().is_empty());
    assert!(!note.is_dirty());
    assert_eq!(note.text_id(), Some(7));
}

#[test]
fn batch_without_first_result_is_a_failure() {
    let mut store = ScriptedStore::new();
    store.push_batch(Ok(vec![None]));

    let mut note = Note::new();
    note.set_call_id(3).expect("call id");
    note.set_call_field(CallField::CallDate(1_700_000_000_000));

    assert!(!note.sync(&mut store, 42).expect("sync"));

    let mut store = ScriptedStore::new();
    store.push_batch(Ok(Vec::new()));
    note.set_call_field(CallField::CallDate(1_700_000_000_001));
    assert!(!note.sync(&mut store, 42).expect("sync"));
}

#[test]
fn call_edit_dirties_parent_row() {
    let before = now_ms();
    let mut note = Note::new();
    note.set_call_field(CallField::PhoneNumber("555-0100".to_string()));

    assert_eq!(note.diff().local_modified, Some(true));
    let stamped = note.diff().modified_date.expect("modified date");
    assert!(stamped >= before);
    assert!(note.data().call().is_dirty());
    assert!(!note.data().text().is_dirty());
}

#[test]
fn malformed_insert_aborts_before_call_payload() {
    let mut store = ScriptedStore::new();
    store.push_insert_location("data/not-a-number");

    let mut note = Note::new();
    note.set_text_field(text("body"));
    note.set_call_field(CallField::PhoneNumber("555-0100".to_string()));

    assert!(!note.sync(&mut store, 42).expect("sync"));

    assert_eq!(note.text_id(), None);
    assert!(!note.data().text().is_dirty());
    assert!(note.data().call().is_dirty());
    assert!(note.is_dirty());
    assert!(
        !store
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Batch(_)))
    );
}

#[test]
fn insert_store_failure_aborts_flush() {
    let mut store = ScriptedStore::new();
    store.push_insert(Err(remote_error("disk full")));

    let mut note = Note::new();
    note.set_text_field(text("body"));

    assert!(!note.sync(&mut store, 42).expect("sync"));
    assert_eq!(note.text_id(), None);
}

#[test]
fn zero_row_note_update_does_not_abort_sub_records() {
    let mut store = ScriptedStore::new();
    store.push_update(Ok(0));

    let mut note = Note::new();
    note.set_field(NoteField::Snippet("hello".to_string()));
    note.set_text_field(text("hello"));

    assert!(note.sync(&mut store, 42).expect("sync"));
    assert!(note.text_id().is_some());
    assert!(!note.is_dirty());
}

#[test]
fn failing_note_update_does_not_abort_sub_records() {
    let mut store = ScriptedStore::new();
    store.push_update(Err(remote_error("timeout")));

    let mut note = Note::new();
    note.set_text_field(text("hello"));

    assert!(note.sync(&mut store, 42).expect("sync"));
    assert!(note.text_id().is_some());
}

#[test]
fn top_level_only_edit_skips_sub_record_flush() {
    let mut store = ScriptedStore::new();
    let mut note = Note::new();
    note.set_field(NoteField::BgColorId(2));
    note.set_field(NoteField::AlertDate(99));

    assert!(note.sync(&mut store, 42).expect("sync"));

    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    let Call::Update(42, Row::Note(diff)) = &calls[0] else {
        panic!("expected note update, got {:?}", calls[0]);
    };
    assert_eq!(diff.bg_color_id, Some(2));
    assert_eq!(diff.alert_date, Some(99));
    assert_eq!(diff.local_modified, Some(true));
}

#[test]
fn both_persisted_buffers_share_one_batch_text_first() {
    let mut store = ScriptedStore::new();
    store.push_batch(Ok(vec![
        Some(OpResult { rows_affected: 1 }),
        Some(OpResult { rows_affected: 1 }),
    ]));

    let mut note = Note::new();
    note.set_text_id(7).expect("text id");
    note.set_call_id(8).expect("call id");
    note.set_call_field(CallField::Content("callback".to_string()));
    note.set_text_field(TextField::ChecklistMode(true));

    assert!(note.sync(&mut store, 42).expect("sync"));

    let batches: Vec<Vec<BatchOp>> = store
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Batch(ops) => Some(ops),
            _ => None,
        })
        .collect();
    assert_eq!(batches.len(), 1);
    let ids: Vec<i64> = batches[0]
        .iter()
        .map(|BatchOp::Update { id, .. }| *id)
        .collect();
    assert_eq!(ids, vec![7, 8]);
}

#[test]
fn mixed_insert_and_update_in_one_flush() {
    let mut store = ScriptedStore::new();
    store.push_insert_location("data/11");

    let mut note = Note::new();
    note.set_text_id(7).expect("text id");
    note.set_text_field(text("edited"));
    note.set_call_field(CallField::PhoneNumber("555-0199".to_string()));

    assert!(note.sync(&mut store, 42).expect("sync"));
    assert_eq!(note.call_id(), Some(11));

    let calls = store.calls();
    assert!(matches!(calls.last(), Some(Call::Batch(ops)) if ops.len() == 1));
}

#[test]
fn non_positive_ids_are_rejected() {
    let mut store = ScriptedStore::new();
    let mut note = Note::new();
    note.set_text_field(text("x"));

    assert!(matches!(note.sync(&mut store, 0), Err(NoteError::InvalidArgument { id: 0, .. })));
    assert!(store.calls().is_empty());
    assert!(note.is_dirty());

    assert!(matches!(note.set_text_id(0), Err(NoteError::InvalidArgument { .. })));
    assert!(matches!(note.set_call_id(-3), Err(NoteError::InvalidArgument { id: -3, .. })));
    assert_eq!(note.text_id(), None);

    let mut data = NoteData::new();
    assert!(matches!(data.flush(&mut store, -1), Err(NoteError::InvalidArgument { .. })));
}

#[test]
fn insert_without_location_fails_the_sync() {
    let mut store = ScriptedStore::new();
    store.push_insert(Ok(None));

    let mut note = Note::new();
    note.set_text_field(text("x"));

    assert!(!note.sync(&mut store, 5).expect("sync"));
    assert_eq!(note.text_id(), None);
    assert!(!note.data().is_dirty());
}

#[test]
fn clean_tracker_flush_is_vacuous() {
    let mut store = ScriptedStore::new();
    let mut data = NoteData::new();
    data.flush(&mut store, 5).expect("flush");
    assert!(store.calls().is_empty());
}
