//! Dispatch for a single client connection to a storage server's
//! client-facing port: `READ`, `STREAM`, `WRITE`, `UNDO`,
//! `GET_CONTENT`.

use std::io::Write as _;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use scribe_core::WireError;
use scribe_protocol::client_ss::{ClientSsCommand, WriteSessionMessage};
use scribe_protocol::wire::{recv_message, send_message, MAX_MESSAGE_SIZE};

use crate::control::NmControlChannel;
use crate::error::StorageError;
use crate::file_store::FileStore;
use crate::locks::{FileLocks, SentenceLocks};
use crate::mod_log::ModLog;
use crate::write_session::WriteSession;

/// The delay between tokens of a `STREAM` response, part of the
/// wire contract and not an implementation detail.
const STREAM_TOKEN_DELAY: Duration = Duration::from_millis(100);

/// Shared handles a session handler needs; cheap to clone, every
/// field is itself reference-counted or interior-mutable.
#[derive(Clone)]
pub struct ServerState {
    pub store: FileStore,
    pub sentence_locks: Arc<SentenceLocks>,
    pub file_locks: Arc<FileLocks>,
    pub mod_log: Arc<ModLog>,
    pub control: Arc<NmControlChannel>,
}

/// Services one client connection to completion.
pub fn handle_connection(mut stream: TcpStream, state: ServerState) {
    let message = match recv_message(&mut stream) {
        Ok(Some(message)) => message,
        Ok(None) => return,
        Err(error) => {
            tracing::warn!(%error, "failed to read opening command");
            return;
        }
    };

    let command = match ClientSsCommand::parse(&message) {
        Ok(command) => command,
        Err(error) => {
            let _ = send_message(&mut stream, &error.status_line());
            return;
        }
    };

    match command {
        ClientSsCommand::Read { filename } | ClientSsCommand::GetContent { filename } => {
            serve_raw_bytes(&mut stream, &state, &filename);
        }
        ClientSsCommand::Stream { filename } => {
            serve_stream(&mut stream, &state, &filename);
        }
        ClientSsCommand::Undo { filename } => {
            serve_undo(&mut stream, &state, &filename);
        }
        ClientSsCommand::Write { filename, sentence_index } => {
            serve_write(&mut stream, &state, &filename, sentence_index);
        }
    }
}

fn serve_raw_bytes(stream: &mut TcpStream, state: &ServerState, filename: &str) {
    let bytes = match state.store.read_bytes(filename) {
        Ok(bytes) => bytes,
        Err(error) => {
            let wire: WireError = error.into();
            let _ = send_message(stream, &wire.status_line());
            return;
        }
    };
    for chunk in bytes.chunks(MAX_MESSAGE_SIZE) {
        if stream.write_all(chunk).is_err() {
            return;
        }
    }
}

fn serve_stream(stream: &mut TcpStream, state: &ServerState, filename: &str) {
    let content = match state.store.read_to_string(filename) {
        Ok(content) => content,
        Err(error) => {
            let wire: WireError = error.into();
            let _ = send_message(stream, &wire.status_line());
            return;
        }
    };
    for token in scribe_tokenizer::split_into_words(&content) {
        if send_message(stream, &token).is_err() {
            return;
        }
        thread::sleep(STREAM_TOKEN_DELAY);
    }
}

fn serve_undo(stream: &mut TcpStream, state: &ServerState, filename: &str) {
    let lock = state.file_locks.get(filename);
    let result = (|| -> Result<crate::file_store::ContentStats, WireError> {
        let _guard = lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        state.store.restore_undo(filename)?;
        let content = state.store.read_to_string(filename)?;
        Ok(crate::file_store::ContentStats::of(&content))
    })();

    match result {
        Ok(stats) => {
            let _ = send_message(stream, &scribe_core::error::ok_line(200, ""));
            state.control.send_info_update(filename, stats);
        }
        Err(error) => {
            let _ = send_message(stream, &error.status_line());
        }
    }
}

fn serve_write(stream: &mut TcpStream, state: &ServerState, filename: &str, sentence_index: i64) {
    let mut session =
        match WriteSession::open(&state.store, &state.sentence_locks, &state.mod_log, filename, sentence_index) {
            Ok(session) => session,
            Err(error) => {
                let _ = send_message(stream, &error.status_line());
                return;
            }
        };

    if send_message(stream, "202 ACK_WRITE: Ready for updates.").is_err() {
        state.sentence_locks.unlock(filename, sentence_index);
        return;
    }

    loop {
        match recv_message(stream) {
            Ok(Some(line)) => match WriteSessionMessage::parse(&line) {
                Ok(WriteSessionMessage::End) => break,
                Ok(WriteSessionMessage::Update { word_index, content }) => {
                    session.buffer(word_index, content);
                }
                Err(_) => {
                    // Malformed update lines are dropped silently; the
                    // session keeps buffering rather than aborting
                    // mid-stream.
                }
            },
            // A client disconnect during phase 2 is an implicit ETIRW:
            // commit whatever was buffered.
            Ok(None) => break,
            Err(_) => break,
        }
    }

    match session.commit(&state.store, &state.file_locks, &state.mod_log, &state.sentence_locks) {
        Ok(stats) => {
            let _ = send_message(stream, &scribe_core::error::ok_line(200, ""));
            state.control.send_info_update(filename, stats);
        }
        Err(error) => {
            let _ = send_message(stream, &error.status_line());
        }
    }
}
