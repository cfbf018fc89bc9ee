#![deny(unsafe_code)]

//! # Overview
//!
//! `scribe_client` is the thin client side of the protocol: a
//! session object per peer ([`session::NmSession`] for the name
//! server, [`ss`] for a storage server once routed there) plus a
//! one-shot command-line front end ([`cli`]).
//!
//! This is deliberately not an interactive REPL: the original
//! tool's read-eval-print prompt is an external collaborator this
//! crate serves, not something it reimplements. Each [`cli::run`]
//! invocation issues exactly one command and exits.

pub mod cli;
pub mod error;
pub mod session;
pub mod ss;

pub use cli::run;
pub use error::ClientError;
pub use session::NmSession;
