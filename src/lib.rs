//! Dirty-tracking note aggregate with batched persistence to a record store.
//!
//! # Examples
//!
//! Editing and syncing against [`persist::memory::MemoryRecordStore`]:
//! ```
//! use notesync::{
//!     core::note::Note,
//!     persist::memory::MemoryRecordStore,
//!     record::{CallField, TextField},
//! };
//!
//! let mut store = MemoryRecordStore::new();
//! let note_id = Note::allocate_id(&mut store, 1).expect("allocate");
//!
//! let mut note = Note::new();
//! note.set_text_field(TextField::Content("buy milk".to_string()));
//! note.set_call_field(CallField::PhoneNumber("555-0100".to_string()));
//! assert!(note.is_dirty());
//!
//! assert!(note.sync(&mut store, note_id).expect("sync"));
//! assert!(!note.is_dirty());
//! assert!(note.text_id().is_some());
//! ```
//!
//! Runtime usage with the SQLite store:
//! ```no_run
//! use notesync::{
//!     core::note::Note,
//!     persist::sqlite::SqliteRecordStore,
//!     record::TextField,
//!     runtime::handle::{spawn_note_sync, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = SqliteRecordStore::open("notes.db").expect("open sqlite");
//! let handle = spawn_note_sync(Box::new(store), RuntimeConfig::default());
//! let id = handle.allocate(1).await.expect("allocate");
//!
//! let mut note = Note::new();
//! note.set_text_field(TextField::Content("hello".to_string()));
//! let (_note, ok) = handle.sync(note, id).await.expect("sync");
//! assert!(ok);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

/// Store connection settings.
pub mod config;
/// Note aggregate and sub-record tracker.
pub mod core;
/// Error kinds for mutation and sync.
pub mod error;
/// Record store boundary plus SQLite and in-memory implementations.
pub mod persist;
/// Rows, typed fields, and sparse patches.
pub mod record;
/// Single-writer async runtime handle and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
