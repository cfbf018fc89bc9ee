//! Internal failures that never reach the wire directly.

use scribe_core::WireError;
use thiserror::Error;

/// Failures internal to the name server's own bookkeeping.
#[derive(Debug, Error)]
pub enum NameServerError {
    #[error("invalid filename: {0}")]
    InvalidFilename(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("file already exists: {0}")]
    FileAlreadyExists(String),
    #[error("no storage server is live")]
    NoLiveStorageServer,
    #[error("the owning storage server for {0} is offline")]
    StorageServerOffline(String),
    #[error("permission denied for {user} on {filename}")]
    PermissionDenied { user: String, filename: String },
    #[error("cannot grant access to the owner")]
    CannotGrantOwner,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed persisted record: {0}")]
    Persistence(String),
}

impl From<NameServerError> for WireError {
    fn from(err: NameServerError) -> Self {
        match err {
            NameServerError::InvalidFilename(_) => WireError::bad_request(err.to_string()),
            NameServerError::FileNotFound(_) => WireError::not_found(err.to_string()),
            NameServerError::FileAlreadyExists(_) => WireError::conflict(err.to_string()),
            NameServerError::NoLiveStorageServer | NameServerError::StorageServerOffline(_) => {
                WireError::unavailable(err.to_string())
            }
            NameServerError::PermissionDenied { .. } | NameServerError::CannotGrantOwner => {
                WireError::unauthorized(err.to_string())
            }
            NameServerError::Io(_) | NameServerError::Persistence(_) => WireError::internal(err.to_string()),
        }
    }
}
