//! Note aggregate and sub-record tracker.

/// Sub-record buffers and flush.
pub mod data;
/// Note aggregate, id allocation, and sync.
pub mod note;
