//! The persistent control channel a storage server keeps open to the
//! name server: `INIT_SS` at startup, `CREATE`/`DELETE` commands in,
//! `INFO_UPDATE` acknowledgements out.

use std::io;
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::thread;

use scribe_protocol::handshake::InitSs;
use scribe_protocol::nm_ss::{NmToSsCommand, SsToNmMessage};
use scribe_protocol::wire::{recv_message, send_message};

use crate::file_store::FileStore;

/// A live connection to the name server, shared by every worker
/// thread that needs to push an `INFO_UPDATE`.
pub struct NmControlChannel {
    writer: Mutex<TcpStream>,
}

impl NmControlChannel {
    /// Connects to `nm_addr`, sends the `INIT_SS` handshake
    /// advertising `client_port` and `store`'s resident files, then
    /// spawns the background thread that services NM-driven
    /// `CREATE`/`DELETE`/`GET_CONTENT` commands for the lifetime of
    /// the connection.
    pub fn connect(nm_addr: &str, client_port: u16, store: FileStore) -> io::Result<Arc<Self>> {
        let stream = TcpStream::connect(nm_addr)?;
        let files = store.list_files().unwrap_or_default();
        let init = InitSs { client_port, files };

        let mut write_half = stream.try_clone()?;
        send_message(&mut write_half, &init.render())?;

        let channel = Arc::new(Self { writer: Mutex::new(write_half) });
        let read_half = stream;
        thread::spawn(move || control_loop(read_half, store));
        Ok(channel)
    }

    /// Asynchronously reports fresh stats for `filename` after a
    /// successful write or undo. Failure is logged and dropped —
    /// stats simply drift until the next update.
    pub fn send_info_update(&self, filename: &str, stats: crate::file_store::ContentStats) {
        let message = SsToNmMessage::InfoUpdate {
            filename: filename.to_string(),
            size: stats.size,
            words: stats.word_count,
            chars: stats.char_count,
        }
        .render();
        let Ok(mut writer) = self.writer.lock() else {
            tracing::error!("control channel writer lock poisoned");
            return;
        };
        if let Err(error) = send_message(&mut *writer, &message) {
            tracing::warn!(%filename, %error, "failed to deliver INFO_UPDATE to name server");
        }
    }
}

fn control_loop(mut stream: TcpStream, store: FileStore) {
    loop {
        match recv_message(&mut stream) {
            Ok(Some(message)) => handle_control_command(&message, &store),
            Ok(None) => {
                tracing::info!("name server control channel closed; exiting control loop");
                break;
            }
            Err(error) => {
                tracing::warn!(%error, "name server control channel read failed; exiting control loop");
                break;
            }
        }
    }
}

fn handle_control_command(message: &str, store: &FileStore) {
    let command = match NmToSsCommand::parse(message) {
        Ok(command) => command,
        Err(error) => {
            tracing::warn!(%message, %error, "malformed name server control command");
            return;
        }
    };
    match command {
        NmToSsCommand::Create { filename } => {
            if let Err(error) = store.create_empty(&filename) {
                tracing::warn!(%filename, %error, "failed to create file requested by name server");
            }
        }
        NmToSsCommand::Delete { filename } => {
            if let Err(error) = store.delete(&filename) {
                tracing::warn!(%filename, %error, "failed to delete file requested by name server");
            }
        }
        // `GET_CONTENT` is served over a fresh client connection to
        // this server's client-facing port as part of the EXEC flow,
        // not over the control channel; nothing to do here.
        NmToSsCommand::GetContent { .. } => {}
    }
}
