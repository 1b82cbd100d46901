//! SQLite-backed record store.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params, params_from_iter, types::Value};
use tracing::debug;

use crate::{
    config::StoreConfig,
    record::{DataPatch, DataRow, NotePatch, NoteRow},
    types::{Collection, ContentKind, NoteType, RecordId},
};

use super::{BatchOp, OpResult, RecordStore, Row, RowLocation, StoreResult};

/// SQLite implementation of [`crate::persist::RecordStore`].
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Opens or creates a store at `path` with [`StoreConfig::default`].
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_config(path, &StoreConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: &StoreConfig) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn, config)
    }

    /// Opens an in-memory SQLite store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn, &StoreConfig::default())
    }

    fn init_connection(conn: Connection, config: &StoreConfig) -> StoreResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", &config.journal_mode)?;
        conn.pragma_update(None, "synchronous", &config.synchronous)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Ok(Self { conn })
    }

    /// Journal mode in effect, lowercased as SQLite reports it.
    pub fn journal_mode(&self) -> StoreResult<String> {
        let mode: String = self
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        Ok(mode.to_lowercase())
    }

    pub fn busy_timeout_ms(&self) -> StoreResult<u64> {
        let ms: i64 = self
            .conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))?;
        Ok(ms.max(0) as u64)
    }

    pub fn load_note(&self, id: RecordId) -> StoreResult<Option<NoteRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, parent_id, created_date, modified_date, note_type, local_modified, \
                 snippet, alert_date, bg_color_id, widget_id, widget_type FROM note WHERE id = ?1",
                params![id],
                |row| {
                    let code: i64 = row.get(4)?;
                    let note_type = NoteType::from_code(code).ok_or_else(|| {
                        conversion_error(4, format!("unknown note type {code}"))
                    })?;
                    Ok(NoteRow {
                        id: row.get(0)?,
                        parent_id: row.get(1)?,
                        created_date: row.get(2)?,
                        modified_date: row.get(3)?,
                        note_type,
                        local_modified: row.get(5)?,
                        snippet: row.get(6)?,
                        alert_date: row.get(7)?,
                        bg_color_id: row.get(8)?,
                        widget_id: row.get(9)?,
                        widget_type: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn load_data(&self, id: RecordId) -> StoreResult<Option<DataRow>> {
        let row = self
            .conn
            .query_row(
                &format!("{DATA_SELECT} WHERE id = ?1"),
                params![id],
                read_data_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Sub-records owned by `note_id`, ordered by id.
    pub fn data_for_note(&self, note_id: RecordId) -> StoreResult<Vec<DataRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DATA_SELECT} WHERE note_id = ?1 ORDER BY id ASC"))?;
        let rows = stmt.query_map(params![note_id], read_data_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&mut self, row: &Row) -> StoreResult<Option<RowLocation>> {
        let collection = row.collection();
        let columns = row_columns(row);
        let table = table_name(collection);

        if columns.is_empty() {
            self.conn
                .execute(&format!("INSERT INTO {table} DEFAULT VALUES"), [])?;
        } else {
            let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
            let slots: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                names.join(", "),
                slots.join(", ")
            );
            self.conn
                .execute(&sql, params_from_iter(columns.into_iter().map(|(_, v)| v)))?;
        }

        let id = self.conn.last_insert_rowid();
        debug!(table, id, "sqlite insert");
        Ok(Some(RowLocation::new(collection, id)))
    }

    fn update(&mut self, id: RecordId, row: &Row) -> StoreResult<usize> {
        Ok(execute_update(&self.conn, id, row)?)
    }

    fn submit_batch(&mut self, ops: &[BatchOp]) -> StoreResult<Vec<Option<OpResult>>> {
        let tx = self.conn.transaction()?;
        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            let BatchOp::Update { id, row } = op;
            let rows_affected = execute_update(&tx, *id, row)?;
            results.push(Some(OpResult { rows_affected }));
        }
        tx.commit()?;
        debug!(ops = results.len(), "sqlite batch committed");
        Ok(results)
    }
}

const DATA_SELECT: &str = "SELECT id, note_id, content_kind, content, checklist_mode, \
                           call_date, phone_number FROM data";

fn read_data_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DataRow> {
    let kind: Option<String> = row.get(2)?;
    let content_kind = match kind {
        Some(raw) => Some(
            ContentKind::parse(&raw)
                .ok_or_else(|| conversion_error(2, format!("unknown content kind {raw:?}")))?,
        ),
        None => None,
    };
    Ok(DataRow {
        id: row.get(0)?,
        note_id: row.get(1)?,
        content_kind,
        content: row.get(3)?,
        checklist_mode: row.get(4)?,
        call_date: row.get(5)?,
        phone_number: row.get(6)?,
    })
}

fn conversion_error(col: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        col,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::other(msg)),
    )
}

fn execute_update(conn: &Connection, id: RecordId, row: &Row) -> rusqlite::Result<usize> {
    let table = table_name(row.collection());
    let columns = row_columns(row);

    if columns.is_empty() {
        // Still report whether the target exists.
        return conn.execute(&format!("UPDATE {table} SET id = id WHERE id = ?1"), params![id]);
    }

    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("{name} = ?{}", i + 1))
        .collect();
    let sql = format!(
        "UPDATE {table} SET {} WHERE id = ?{}",
        assignments.join(", "),
        columns.len() + 1
    );
    let values = columns
        .into_iter()
        .map(|(_, v)| v)
        .chain(std::iter::once(Value::Integer(id)));
    conn.execute(&sql, params_from_iter(values))
}

fn table_name(collection: Collection) -> &'static str {
    match collection {
        Collection::Notes => "note",
        Collection::Data => "data",
    }
}

fn row_columns(row: &Row) -> Vec<(&'static str, Value)> {
    match row {
        Row::Note(patch) => note_columns(patch),
        Row::Data(patch) => data_columns(patch),
    }
}

fn note_columns(p: &NotePatch) -> Vec<(&'static str, Value)> {
    let mut cols = Vec::new();
    if let Some(v) = p.parent_id {
        cols.push(("parent_id", Value::Integer(v)));
    }
    if let Some(v) = p.created_date {
        cols.push(("created_date", Value::Integer(v)));
    }
    if let Some(v) = p.modified_date {
        cols.push(("modified_date", Value::Integer(v)));
    }
    if let Some(v) = p.note_type {
        cols.push(("note_type", Value::Integer(v.code())));
    }
    if let Some(v) = p.local_modified {
        cols.push(("local_modified", Value::Integer(i64::from(v))));
    }
    if let Some(v) = &p.snippet {
        cols.push(("snippet", Value::Text(v.clone())));
    }
    if let Some(v) = p.alert_date {
        cols.push(("alert_date", Value::Integer(v)));
    }
    if let Some(v) = p.bg_color_id {
        cols.push(("bg_color_id", Value::Integer(i64::from(v))));
    }
    if let Some(v) = p.widget_id {
        cols.push(("widget_id", Value::Integer(v)));
    }
    if let Some(v) = p.widget_type {
        cols.push(("widget_type", Value::Integer(i64::from(v))));
    }
    cols
}

fn data_columns(p: &DataPatch) -> Vec<(&'static str, Value)> {
    let mut cols = Vec::new();
    if let Some(v) = p.note_id {
        cols.push(("note_id", Value::Integer(v)));
    }
    if let Some(v) = p.content_kind {
        cols.push(("content_kind", Value::Text(v.as_str().to_string())));
    }
    if let Some(v) = &p.content {
        cols.push(("content", Value::Text(v.clone())));
    }
    if let Some(v) = p.checklist_mode {
        cols.push(("checklist_mode", Value::Integer(i64::from(v))));
    }
    if let Some(v) = p.call_date {
        cols.push(("call_date", Value::Integer(v)));
    }
    if let Some(v) = &p.phone_number {
        cols.push(("phone_number", Value::Text(v.clone())));
    }
    cols
}
