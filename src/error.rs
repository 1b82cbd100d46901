//! Error types for note mutation and sync.

use thiserror::Error;

use crate::{persist::StoreError, types::RecordId};

/// Result alias for aggregate and tracker operations.
pub type NoteResult<T> = Result<T, NoteError>;

/// Store response did not yield a usable identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The store acknowledged the insert without a row location.
    #[error("insert response carried no row location")]
    Missing,
    /// The row location could not be parsed into an id.
    #[error("malformed row location: {0:?}")]
    Malformed(String),
    /// The parsed id was zero or negative.
    #[error("store assigned non-positive id {0}")]
    NonPositive(RecordId),
}

/// Errors surfaced by [`crate::core::note::Note`] and
/// [`crate::core::data::NoteData`].
#[derive(Error, Debug)]
pub enum NoteError {
    /// A non-positive identity was passed where a positive one is required.
    #[error("invalid {what} id: {id}")]
    InvalidArgument {
        /// Which identity was rejected.
        what: &'static str,
        /// The rejected value.
        id: RecordId,
    },
    /// Insert produced an unusable identity.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
    /// Transport or remote failure from the record store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Batch was accepted but produced no usable first result.
    #[error("batch submission rejected: {0}")]
    BatchRejected(String),
}

pub(crate) fn ensure_positive(what: &'static str, id: RecordId) -> NoteResult<RecordId> {
    if id <= 0 {
        return Err(NoteError::InvalidArgument { what, id });
    }
    Ok(id)
}
