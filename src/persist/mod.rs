pub mod memory;
pub mod sqlite;

use thiserror::Error;

use crate::{
    error::IdentityError,
    record::{DataPatch, NotePatch},
    types::{Collection, RecordId},
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    /// Connectivity or remote-side rejection.
    #[error("remote: {0}")]
    Remote(String),
    #[error("{0}")]
    Message(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Column values for one write, tagged with the collection they target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Note(NotePatch),
    Data(DataPatch),
}

impl Row {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Note(_) => Collection::Notes,
            Self::Data(_) => Collection::Data,
        }
    }
}

/// Location string returned by an insert, shaped `<collection>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLocation(pub String);

impl RowLocation {
    pub fn new(collection: Collection, id: RecordId) -> Self {
        Self(format!("{}/{id}", collection.as_str()))
    }

    /// Parses the id segment. Zero and negative ids are rejected.
    pub fn record_id(&self) -> Result<RecordId, IdentityError> {
        let segment = self
            .0
            .split('/')
            .nth(1)
            .ok_or_else(|| IdentityError::Malformed(self.0.clone()))?;
        let id: RecordId = segment
            .parse()
            .map_err(|_| IdentityError::Malformed(self.0.clone()))?;
        if id <= 0 {
            return Err(IdentityError::NonPositive(id));
        }
        Ok(id)
    }
}

/// Deferred write queued for a batch submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Update { id: RecordId, row: Row },
}

/// Per-operation outcome of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpResult {
    pub rows_affected: usize,
}

/// Record-oriented data-access boundary.
///
/// Every call is synchronous and runs to completion or fails. Implementations
/// must apply a batch atomically: either every op lands or none does.
pub trait RecordStore: Send {
    fn insert(&mut self, row: &Row) -> StoreResult<Option<RowLocation>>;
    fn update(&mut self, id: RecordId, row: &Row) -> StoreResult<usize>;
    fn submit_batch(&mut self, ops: &[BatchOp]) -> StoreResult<Vec<Option<OpResult>>>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn insert(&mut self, row: &Row) -> StoreResult<Option<RowLocation>> {
        (**self).insert(row)
    }

    fn update(&mut self, id: RecordId, row: &Row) -> StoreResult<usize> {
        (**self).update(id, row)
    }

    fn submit_batch(&mut self, ops: &[BatchOp]) -> StoreResult<Vec<Option<OpResult>>> {
        (**self).submit_batch(ops)
    }
}
