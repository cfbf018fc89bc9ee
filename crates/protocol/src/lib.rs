#![deny(unsafe_code)]

//! # Overview
//!
//! `scribe_protocol` owns the wire format shared by every pair of peers
//! in the system: client↔name-server, client↔storage-server, and
//! name-server↔storage-server. Each module covers one conversation:
//!
//! - [`wire`]: framing (one `recv` is one message, [`wire::MAX_MESSAGE_SIZE`] bound).
//! - [`handshake`]: the first message a client or storage server sends on connect.
//! - [`client_nm`]: the client-facing command set the name server dispatches.
//! - [`client_ss`]: the command set a storage server accepts directly from a client.
//! - [`nm_ss`]: the control channel the name server uses to drive a storage server.
//!
//! # Design
//!
//! Parsing is deliberately dumb: every `parse` function is a thin
//! `split_whitespace` over an already-framed message, returning a
//! [`scribe_core::WireError::BadRequest`] on anything it cannot make
//! sense of. None of these types know how to talk to a socket; that is
//! [`wire::send_message`] and [`wire::recv_message`]'s job, one layer
//! down from here, and the dispatch logic in `scribe-nameserver` /
//! `scribe-storage` one layer up.

pub mod client_nm;
pub mod client_ss;
pub mod handshake;
pub mod nm_ss;
pub mod wire;

pub use wire::{recv_message, send_message, MAX_MESSAGE_SIZE};
