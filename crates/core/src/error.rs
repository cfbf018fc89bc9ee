//! Wire error taxonomy shared by the name server and storage server.

use thiserror::Error;

/// The seven error kinds that the system ever reports back across the
/// wire, each tied to the 3-digit status code it reports.
#[derive(Debug, Clone, Error)]
pub enum WireError {
    /// Malformed or out-of-range request.
    #[error("{0}")]
    BadRequest(String),
    /// Caller lacks the permission required for the operation.
    #[error("{0}")]
    Unauthorized(String),
    /// The named file (or other resource) does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The resource being created already exists.
    #[error("{0}")]
    Conflict(String),
    /// A sentence lock is already held by another session.
    #[error("{0}")]
    Locked(String),
    /// Internal failure: I/O error, tokenizer inconsistency, poisoned lock.
    #[error("{0}")]
    Internal(String),
    /// No storage server is live to serve the request.
    #[error("{0}")]
    Unavailable(String),
}

impl WireError {
    /// The 3-digit status code for this error kind.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Locked(_) => 423,
            Self::Internal(_) => 500,
            Self::Unavailable(_) => 503,
        }
    }

    /// Renders this error as the `"<code> ERROR: <detail>"` wire line.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("{} ERROR: {}", self.code(), self)
    }

    /// Shorthand constructors, one per kind, taking any `Display`-able detail.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }

    /// See [`WireError::bad_request`].
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::Unauthorized(detail.into())
    }

    /// See [`WireError::bad_request`].
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    /// See [`WireError::bad_request`].
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict(detail.into())
    }

    /// See [`WireError::bad_request`].
    pub fn locked(detail: impl Into<String>) -> Self {
        Self::Locked(detail.into())
    }

    /// See [`WireError::bad_request`].
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// See [`WireError::bad_request`].
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable(detail.into())
    }
}

/// Renders a `"<code> OK ..."` success line for the handful of 2xx replies
/// that carry a payload (routing responses, ack lines).
#[must_use]
pub fn ok_line(code: u16, detail: &str) -> String {
    if detail.is_empty() {
        format!("{code} OK")
    } else {
        format!("{code} OK {detail}")
    }
}
