//! Internal failures that never reach the wire directly; every public
//! entry point converts these into a [`scribe_core::WireError`] at the
//! boundary.

use scribe_core::WireError;
use thiserror::Error;

/// Failures internal to the storage server's own bookkeeping.
#[derive(Debug, Error)]
pub enum StorageError {
    /// `filename` failed the shared naming invariant enforced by
    /// [`scribe_core::Filename`].
    #[error("invalid filename: {0}")]
    InvalidFilename(String),
    /// The requested file does not exist on this server.
    #[error("file not found: {0}")]
    FileNotFound(String),
    /// No undo backup is available for the requested file.
    #[error("no undo available for: {0}")]
    NoUndoAvailable(String),
    /// The requested sentence index is outside the range phase 0 allows.
    #[error("sentence index {0} out of range (max {1})")]
    SentenceIndexOutOfRange(i64, usize),
    /// The sentence lock for `(filename, index)` is already held.
    #[error("sentence {1} of {0} is locked")]
    SentenceLocked(String, i64),
    /// A word index in a buffered update fell outside `[0, word_count]`.
    #[error("word index {0} out of range (max {1})")]
    WordIndexOutOfRange(usize, usize),
    /// Disk I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A lock was poisoned by a panicking holder.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl From<StorageError> for WireError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFilename(_) => WireError::bad_request(err.to_string()),
            StorageError::FileNotFound(_) | StorageError::NoUndoAvailable(_) => {
                WireError::not_found(err.to_string())
            }
            StorageError::SentenceIndexOutOfRange(_, _) => WireError::bad_request(err.to_string()),
            StorageError::SentenceLocked(_, _) => {
                WireError::locked("This sentence is being edited by another user.")
            }
            StorageError::WordIndexOutOfRange(_, _)
            | StorageError::Io(_)
            | StorageError::LockPoisoned => WireError::internal(err.to_string()),
        }
    }
}
