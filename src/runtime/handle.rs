use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tracing::debug;

use crate::{
    core::note::Note,
    error::NoteError,
    persist::RecordStore,
    types::RecordId,
};

use super::events::NoteEvent;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error("runtime channel closed")]
    ChannelClosed,
    #[error("blocking task failed: {0}")]
    Join(String),
}

/// Failed [`NoteSyncHandle::sync`], carrying the note back whenever it
/// survived the round trip.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SyncError {
    /// The caller's note with its pending edits, `None` only if the writer
    /// task lost it (reply dropped or blocking task panicked).
    pub note: Option<Note>,
    #[source]
    pub error: RuntimeError,
}

impl SyncError {
    fn lost(error: RuntimeError) -> Self {
        Self { note: None, error }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command_queue_bound: usize,
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
        }
    }
}

pub struct NoteSyncHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<NoteEvent>,
}

impl Clone for NoteSyncHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

type SharedStore = Arc<Mutex<Box<dyn RecordStore>>>;

enum Command {
    Allocate {
        folder_id: RecordId,
        resp: oneshot::Sender<Result<RecordId, RuntimeError>>,
    },
    Sync {
        note: Note,
        note_id: RecordId,
        resp: oneshot::Sender<Result<(Note, bool), SyncError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Spawns the single-writer loop that owns `store`.
///
/// Commands run one at a time in arrival order; store I/O runs on the
/// blocking pool.
pub fn spawn_note_sync(store: Box<dyn RecordStore>, config: RuntimeConfig) -> NoteSyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<NoteEvent>(config.event_capacity);

    let events_tx_loop = events_tx.clone();
    let store: SharedStore = Arc::new(Mutex::new(store));

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &store, &events_tx_loop).await {
                break;
            }
        }
        debug!("note sync loop stopped");
    });

    NoteSyncHandle { cmd_tx, events_tx }
}

impl NoteSyncHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<NoteEvent> {
        self.events_tx.subscribe()
    }

    pub async fn allocate(&self, folder_id: RecordId) -> Result<RecordId, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Allocate { folder_id, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Syncs `note` and hands it back with the outcome.
    ///
    /// On error the note is returned inside [`SyncError`] unchanged by the
    /// failed call, except where the writer task itself went away.
    pub async fn sync(&self, note: Note, note_id: RecordId) -> Result<(Note, bool), SyncError> {
        let (tx, rx) = oneshot::channel();
        let sent = self
            .cmd_tx
            .send(Command::Sync {
                note,
                note_id,
                resp: tx,
            })
            .await;
        if let Err(mpsc::error::SendError(cmd)) = sent {
            let note = match cmd {
                Command::Sync { note, .. } => Some(note),
                _ => None,
            };
            return Err(SyncError {
                note,
                error: RuntimeError::ChannelClosed,
            });
        }
        rx.await.map_err(|_| SyncError::lost(RuntimeError::ChannelClosed))?
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

async fn handle_command(
    cmd: Command,
    store: &SharedStore,
    events_tx: &broadcast::Sender<NoteEvent>,
) -> bool {
    match cmd {
        Command::Allocate { folder_id, resp } => {
            let store_ref = Arc::clone(store);
            let res = run_blocking(move || {
                let mut store = store_ref.blocking_lock();
                Note::allocate_id(&mut **store, folder_id)
            })
            .await;
            if let Ok(id) = res {
                let _ = events_tx.send(NoteEvent::Allocated { id });
            }
            let _ = resp.send(res);
        }
        Command::Sync {
            note,
            note_id,
            resp,
        } => {
            let store_ref = Arc::clone(store);
            let res = tokio::task::spawn_blocking(move || {
                let mut note = note;
                let mut store = store_ref.blocking_lock();
                match note.sync(&mut **store, note_id) {
                    Ok(ok) => Ok((note, ok)),
                    Err(err) => Err(SyncError {
                        note: Some(note),
                        error: RuntimeError::Note(err),
                    }),
                }
            })
            .await
            .unwrap_or_else(|e| Err(SyncError::lost(RuntimeError::Join(e.to_string()))));
            match &res {
                Ok((_, true)) => {
                    let _ = events_tx.send(NoteEvent::Synced { note_id });
                }
                Ok((_, false)) => {
                    let _ = events_tx.send(NoteEvent::SyncFailed { note_id });
                }
                Err(_) => {}
            }
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

async fn run_blocking<T, F>(f: F) -> Result<T, RuntimeError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, NoteError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RuntimeError::Join(e.to_string()))?
        .map_err(RuntimeError::from)
}
