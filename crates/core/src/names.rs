//! Thin newtypes so filenames and usernames are not passed around the
//! workspace as bare `String`s.

use std::fmt;

/// A validated filename: no path separators, no whitespace, not empty,
/// at most 255 bytes. The name server's `FileMetadata.filename` and
/// every path built from it route through here first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Filename(String);

/// A validated username: non-empty, no whitespace (usernames are a token
/// in space-separated wire messages).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

/// Why a raw string was rejected as a [`Filename`] or [`Username`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,
    #[error("name must not contain a path separator")]
    PathSeparator,
    #[error("name must not contain whitespace")]
    Whitespace,
    #[error("name exceeds the maximum length of {0} bytes")]
    TooLong(usize),
}

const MAX_FILENAME_LEN: usize = 255;

impl Filename {
    /// Validates and wraps `raw`. Rejects empty names, path separators,
    /// whitespace, and names over [`MAX_FILENAME_LEN`] bytes.
    pub fn new(raw: impl Into<String>) -> Result<Self, NameError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(NameError::Empty);
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(NameError::PathSeparator);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(NameError::Whitespace);
        }
        if raw.len() > MAX_FILENAME_LEN {
            return Err(NameError::TooLong(MAX_FILENAME_LEN));
        }
        Ok(Self(raw))
    }

    /// Borrows the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Username {
    /// Validates and wraps `raw`. Rejects empty names and any whitespace,
    /// since a username is one token in a space-separated wire message.
    pub fn new(raw: impl Into<String>) -> Result<Self, NameError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(NameError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(NameError::Whitespace);
        }
        Ok(Self(raw))
    }

    /// Borrows the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
