#![deny(unsafe_code)]

//! # Overview
//!
//! `scribe_core` holds the small set of facilities shared by every other
//! crate in the workspace: the seven-code wire error taxonomy and a
//! couple of newtypes used at crate boundaries so filenames and
//! usernames are not passed around as bare `String`s.
//!
//! # Design
//!
//! [`WireError`] is the single vocabulary for anything that must be
//! reported back across the wire as a `"<code> ERROR: ..."` line. Each
//! crate defines its own internal error enum for failures that never
//! reach the wire directly (poisoned locks, malformed persisted state)
//! and converts into `WireError` only at the dispatch boundary.
//!
//! # Invariants
//!
//! - [`WireError::code`] never returns a value outside the seven codes
//!   enumerated in the taxonomy.
//! - [`WireError::status_line`] never panics regardless of the detail
//!   string supplied.

pub mod error;
pub mod names;

pub use error::WireError;
pub use names::{Filename, NameError, Username};
