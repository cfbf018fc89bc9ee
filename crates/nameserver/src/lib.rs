#![deny(unsafe_code)]

//! # Overview
//!
//! `scribe_nameserver` is the name server: the system's directory and
//! gatekeeper. It owns the file metadata table ([`table`]), the set
//! of ever-seen users ([`users`]), the live storage-server registry
//! and round-robin assignment ([`registry`]), and the per-connection
//! dispatch that answers every client command except raw file bytes
//! ([`dispatch`]).
//!
//! # Design
//!
//! A connection's first message decides its fate: `INIT_CLIENT`
//! starts a client command loop, `INIT_SS` starts a storage server's
//! persistent control channel ([`dispatch::handle_connection`]).
//! File-bytes operations (`READ`/`STREAM`/`WRITE`/`UNDO`) are only
//! ever *routed* here: the name server replies with the owning
//! storage server's address and the client connects there directly.
//!
//! [`state::NameServerState`] is the one piece of shared state handed
//! to every worker thread. Structural changes to the file table go
//! through a table-wide lock; per-file field updates go through that
//! file's own mutex.
//!
//! # Invariants
//!
//! - A filename maps to at most one storage server at a time
//!   ([`table::FileTable::reconcile_ss_location`]).
//! - [`info_cache::InfoCache`] is invalidated on every mutation that
//!   could change an `INFO` reply's content.

pub mod dispatch;
pub mod error;
pub mod exec;
pub mod info_cache;
pub mod metadata;
pub mod persistence;
pub mod registry;
pub mod server;
pub mod state;
pub mod table;
pub mod trie;
pub mod users;

pub use server::{run, Cli};
