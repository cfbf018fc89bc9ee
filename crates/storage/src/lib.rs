#![deny(unsafe_code)]

//! # Overview
//!
//! `scribe_storage` is the storage server: the system's hard core.
//! It owns file bytes on disk, the two-phase collaborative write
//! session ([`write_session`]), the single-shot undo backup, and the
//! modification log that resolves sentence-index drift between
//! concurrent writers ([`mod_log`]).
//!
//! # Design
//!
//! [`file_store::FileStore`] is the only module that touches the
//! filesystem. Everything above it, [`write_session::WriteSession`],
//! [`session_handler`]'s command dispatch, [`control`]'s name-server
//! channel, works against that abstraction so the write-session
//! engine's tests run against a scratch `tempfile` directory rather
//! than mocking I/O.
//!
//! [`locks::SentenceLocks`] is held from a `WRITE` session's start to
//! its end (spanning the client's interactive think-time);
//! [`locks::FileLocks`] is acquired only during phase 3's commit or
//! during `UNDO`, never across network I/O.
//!
//! # Invariants
//!
//! - A sentence lock is released on every exit path of a `WRITE`
//!   session: successful commit, commit error, or client disconnect
//!   mid-session (see [`write_session::WriteSession::commit`]).
//! - The modification log is append-only for the process's lifetime;
//!   nothing in this crate truncates it.

pub mod control;
pub mod error;
pub mod file_store;
pub mod locks;
pub mod mod_log;
pub mod server;
pub mod session_handler;
pub mod write_session;

pub use server::{run, Cli};
