//! Per-connection command dispatch: the `INIT_CLIENT`/`INIT_SS` branch
//! and every downstream client-to-name-server command.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use scribe_core::error::ok_line;
use scribe_core::{Filename, WireError};
use scribe_protocol::client_nm::{AccessLevel, ClientCommand, ViewFlags};
use scribe_protocol::handshake::{InitClient, InitSs};
use scribe_protocol::nm_ss::{NmToSsCommand, SsToNmMessage};
use scribe_protocol::wire::{recv_message, send_message};

use crate::error::NameServerError;
use crate::exec;
use crate::metadata::{FileMetadata, Permission};
use crate::state::NameServerState;

/// The name server applies a 5-second receive timeout only to a
/// connection's first message, to distinguish clients from storage
/// servers and reject dead peers.
const INIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Services one connection to completion: reads the opening
/// handshake under a bounded timeout, then branches into the client
/// or storage-server per-connection loop.
pub fn handle_connection(mut stream: TcpStream, state: Arc<NameServerState>) {
    if stream.set_read_timeout(Some(INIT_TIMEOUT)).is_err() {
        return;
    }
    let message = match recv_message(&mut stream) {
        Ok(Some(message)) => message,
        Ok(None) => return,
        Err(error) => {
            tracing::warn!(%error, "failed to read opening handshake");
            return;
        }
    };
    if stream.set_read_timeout(None).is_err() {
        return;
    }

    match message.split_whitespace().next() {
        Some("INIT_CLIENT") => match InitClient::parse(&message) {
            Ok(init) => serve_client(stream, &state, init.username),
            Err(error) => {
                let _ = send_message(&mut stream, &error.status_line());
            }
        },
        Some("INIT_SS") => match InitSs::parse(&message) {
            Ok(init) => serve_storage_server(stream, &state, init),
            Err(error) => {
                let _ = send_message(&mut stream, &error.status_line());
            }
        },
        _ => {
            let error = WireError::bad_request("Expected INIT_CLIENT or INIT_SS");
            let _ = send_message(&mut stream, &error.status_line());
        }
    }
}

fn serve_client(mut stream: TcpStream, state: &Arc<NameServerState>, username: String) {
    state.users.record(&username);
    state.persist();
    tracing::info!(%username, "client connected");

    loop {
        let message = match recv_message(&mut stream) {
            Ok(Some(message)) => message,
            Ok(None) => return,
            Err(error) => {
                tracing::warn!(%error, %username, "client read failed");
                return;
            }
        };

        let command = match ClientCommand::parse(&message) {
            Ok(command) => command,
            Err(error) => {
                let _ = send_message(&mut stream, &error.status_line());
                continue;
            }
        };

        if !dispatch_client_command(&mut stream, state, &username, command) {
            return;
        }
    }
}

/// Dispatches one already-parsed client command, writing its reply.
/// Returns whether the connection should stay open for another
/// command.
fn dispatch_client_command(stream: &mut TcpStream, state: &NameServerState, username: &str, command: ClientCommand) -> bool {
    match command {
        ClientCommand::View { flags } => reply(stream, Ok(render_view(state, username, flags))),
        ClientCommand::Create { filename } => reply(stream, handle_create(state, username, &filename)),
        ClientCommand::Delete { filename } => reply(stream, handle_delete(state, username, &filename)),
        ClientCommand::Read { filename } => reply(stream, route_to_ss(state, username, &filename, Permission::Read)),
        ClientCommand::Stream { filename } => reply(stream, route_to_ss(state, username, &filename, Permission::Read)),
        ClientCommand::Write { filename } => reply(stream, route_to_ss(state, username, &filename, Permission::Write)),
        ClientCommand::Undo { filename } => reply(stream, route_to_ss(state, username, &filename, Permission::Write)),
        ClientCommand::Info { filename } => reply(stream, handle_info(state, username, &filename)),
        ClientCommand::AddAccess { level, filename, target_user } => {
            reply(stream, handle_add_access(state, username, &filename, level, &target_user))
        }
        ClientCommand::RemAccess { filename, target_user } => {
            reply(stream, handle_rem_access(state, username, &filename, &target_user))
        }
        ClientCommand::Exec { filename } => handle_exec(stream, state, username, &filename),
        ClientCommand::List => reply(stream, Ok(ok_line(200, &state.users.all().join(",")))),
    }
}

fn reply(stream: &mut TcpStream, result: Result<String, WireError>) -> bool {
    let line = result.unwrap_or_else(|error| error.status_line());
    send_message(stream, &line).is_ok()
}

fn render_view(state: &NameServerState, username: &str, flags: ViewFlags) -> String {
    let mut files = state.table.snapshot();
    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    let mut lines = vec!["200 OK".to_string()];
    for file in &files {
        if !flags.all && !file.check_access(username, Permission::Read) {
            continue;
        }
        if flags.long {
            lines.push(format!(
                "{} owner={} size={} words={} chars={} modified={}",
                file.filename, file.owner, file.size, file.word_count, file.char_count, file.last_modified
            ));
        } else {
            lines.push(file.filename.clone());
        }
    }
    lines.join("\n")
}

fn handle_create(state: &NameServerState, username: &str, filename: &str) -> Result<String, WireError> {
    Filename::new(filename).map_err(|e| NameServerError::InvalidFilename(e.to_string()))?;
    if state.table.contains(filename) {
        return Err(NameServerError::FileAlreadyExists(filename.to_string()).into());
    }
    let server = state.ss_registry.pick_round_robin().ok_or(NameServerError::NoLiveStorageServer)?;
    server.send_command(&NmToSsCommand::Create { filename: filename.to_string() });
    state.table.insert(FileMetadata::new(filename, username, server.ip.as_str(), server.client_port));
    state.info_cache.invalidate(filename);
    state.persist();
    Ok(ok_line(201, &format!("Created {filename}")))
}

fn handle_delete(state: &NameServerState, username: &str, filename: &str) -> Result<String, WireError> {
    let handle = state.table.get(filename).ok_or_else(|| NameServerError::FileNotFound(filename.to_string()))?;
    {
        let metadata = handle.lock().expect("metadata entry lock poisoned");
        if metadata.owner != username {
            return Err(NameServerError::PermissionDenied { user: username.to_string(), filename: filename.to_string() }.into());
        }
        if let Some(server) = live_server_for(state, &metadata) {
            server.send_command(&NmToSsCommand::Delete { filename: filename.to_string() });
        }
    }
    state.table.remove(filename);
    state.info_cache.invalidate(filename);
    state.persist();
    Ok(ok_line(200, ""))
}

/// Authorizes and routes a file-bytes operation to its storage
/// server, replying `202 OK <ip>:<port>` for the client's follow-on
/// connection.
fn route_to_ss(state: &NameServerState, username: &str, filename: &str, required: Permission) -> Result<String, WireError> {
    let handle = state.table.get(filename).ok_or_else(|| NameServerError::FileNotFound(filename.to_string()))?;
    let address = {
        let mut metadata = handle.lock().expect("metadata entry lock poisoned");
        if !metadata.check_access(username, required) {
            return Err(NameServerError::PermissionDenied { user: username.to_string(), filename: filename.to_string() }.into());
        }
        if !state.ss_registry.is_live(&metadata.ss_ip, metadata.ss_client_port) {
            return Err(NameServerError::StorageServerOffline(filename.to_string()).into());
        }
        metadata.touch_accessed();
        format!("{}:{}", metadata.ss_ip, metadata.ss_client_port)
    };
    Ok(ok_line(202, &address))
}

fn handle_info(state: &NameServerState, username: &str, filename: &str) -> Result<String, WireError> {
    let handle = state.table.get(filename).ok_or_else(|| NameServerError::FileNotFound(filename.to_string()))?;
    let metadata = handle.lock().expect("metadata entry lock poisoned");
    if !metadata.check_access(username, Permission::Read) {
        return Err(NameServerError::PermissionDenied { user: username.to_string(), filename: filename.to_string() }.into());
    }
    if let Some(cached) = state.info_cache.get(filename) {
        return Ok(ok_line(200, &cached));
    }
    let body = format!(
        "filename={} owner={} size={} words={} chars={} created={} modified={} accessed={}",
        metadata.filename,
        metadata.owner,
        metadata.size,
        metadata.word_count,
        metadata.char_count,
        metadata.created_at,
        metadata.last_modified,
        metadata.last_accessed,
    );
    state.info_cache.put(filename, body.clone());
    Ok(ok_line(200, &body))
}

fn handle_add_access(
    state: &NameServerState,
    username: &str,
    filename: &str,
    level: AccessLevel,
    target_user: &str,
) -> Result<String, WireError> {
    let handle = state.table.get(filename).ok_or_else(|| NameServerError::FileNotFound(filename.to_string()))?;
    let mut metadata = handle.lock().expect("metadata entry lock poisoned");
    if metadata.owner != username {
        return Err(NameServerError::PermissionDenied { user: username.to_string(), filename: filename.to_string() }.into());
    }
    if target_user == metadata.owner {
        return Err(NameServerError::CannotGrantOwner.into());
    }
    let permission = match level {
        AccessLevel::Read => Permission::Read,
        AccessLevel::Write => Permission::Write,
    };
    metadata.access_list.grant(target_user, permission);
    drop(metadata);
    state.info_cache.invalidate(filename);
    state.persist();
    Ok(ok_line(200, ""))
}

fn handle_rem_access(state: &NameServerState, username: &str, filename: &str, target_user: &str) -> Result<String, WireError> {
    let handle = state.table.get(filename).ok_or_else(|| NameServerError::FileNotFound(filename.to_string()))?;
    let mut metadata = handle.lock().expect("metadata entry lock poisoned");
    if metadata.owner != username {
        return Err(NameServerError::PermissionDenied { user: username.to_string(), filename: filename.to_string() }.into());
    }
    metadata.access_list.revoke(target_user);
    drop(metadata);
    state.info_cache.invalidate(filename);
    state.persist();
    Ok(ok_line(200, ""))
}

fn handle_exec(stream: &mut TcpStream, state: &NameServerState, username: &str, filename: &str) -> bool {
    let handle = match state.table.get(filename) {
        Some(handle) => handle,
        None => return reply(stream, Err(NameServerError::FileNotFound(filename.to_string()).into())),
    };
    let server = {
        let metadata = handle.lock().expect("metadata entry lock poisoned");
        if !metadata.check_access(username, Permission::Read) {
            return reply(
                stream,
                Err(NameServerError::PermissionDenied { user: username.to_string(), filename: filename.to_string() }.into()),
            );
        }
        match live_server_for(state, &metadata) {
            Some(server) => server,
            None => return reply(stream, Err(NameServerError::StorageServerOffline(filename.to_string()).into())),
        }
    };

    if let Err(error) = exec::run(stream, &server, filename) {
        return reply(stream, Err(error));
    }
    true
}

fn live_server_for(state: &NameServerState, metadata: &FileMetadata) -> Option<Arc<crate::registry::LiveStorageServer>> {
    state.ss_registry.find(&metadata.ss_ip, metadata.ss_client_port)
}

fn serve_storage_server(stream: TcpStream, state: &Arc<NameServerState>, init: InitSs) {
    let ip = match stream.peer_addr() {
        Ok(addr) => addr.ip().to_string(),
        Err(_) => return,
    };

    let orphans = state.table.reconcile_ss_location(&init.files, &ip, init.client_port);
    for filename in &orphans {
        tracing::warn!(%filename, %ip, port = init.client_port, "storage server advertised an orphaned file");
    }
    for filename in &init.files {
        state.info_cache.invalidate(filename);
    }
    state.persist();

    let writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(error) => {
            tracing::warn!(%error, "failed to clone storage server control stream");
            return;
        }
    };
    let server = state.ss_registry.register(ip.clone(), init.client_port, writer);
    tracing::info!(ip, port = init.client_port, files = init.files.len(), "storage server registered");

    let mut read_half = stream;
    loop {
        match recv_message(&mut read_half) {
            Ok(Some(message)) => handle_ss_update(state, &message),
            Ok(None) => break,
            Err(error) => {
                tracing::warn!(%error, "storage server control channel read failed");
                break;
            }
        }
    }

    state.ss_registry.remove(server.id);
    tracing::info!(ip, port = init.client_port, "storage server disconnected");
}

fn handle_ss_update(state: &NameServerState, message: &str) {
    match SsToNmMessage::parse(message) {
        Ok(SsToNmMessage::InfoUpdate { filename, size, words, chars }) => {
            if let Some(handle) = state.table.get(&filename) {
                handle.lock().expect("metadata entry lock poisoned").apply_stats(size, words, chars);
                state.info_cache.invalidate(&filename);
                state.persist();
            }
        }
        Err(error) => {
            tracing::warn!(%message, %error, "malformed storage server update");
        }
    }
}
