//! End-to-end tests of the storage server's client-facing wire
//! protocol over real loopback TCP connections rather than mocked
//! ones.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use scribe_protocol::wire::{recv_message, send_message};
use scribe_storage::control::NmControlChannel;
use scribe_storage::file_store::FileStore;
use scribe_storage::locks::{FileLocks, SentenceLocks};
use scribe_storage::mod_log::ModLog;
use scribe_storage::server;
use scribe_storage::session_handler::ServerState;

/// Starts a stub name server that accepts exactly one `INIT_SS`
/// handshake and then goes quiet, and a real storage server wired
/// against a fresh scratch directory. Returns the storage server's
/// client-facing address.
fn spin_up_storage_server() -> (std::net::SocketAddr, tempfile::TempDir) {
    let nm_stub = TcpListener::bind("127.0.0.1:0").unwrap();
    let nm_addr = nm_stub.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut conn, _)) = nm_stub.accept() {
            let mut buf = [0u8; 4096];
            let _ = conn.read(&mut buf);
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path()).unwrap();
    let client_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client_addr = client_listener.local_addr().unwrap();

    let control = NmControlChannel::connect(&nm_addr.to_string(), client_addr.port(), store.clone()).unwrap();
    let state = ServerState {
        store,
        sentence_locks: Arc::new(SentenceLocks::new()),
        file_locks: Arc::new(FileLocks::new()),
        mod_log: Arc::new(ModLog::new()),
        control,
    };

    thread::spawn(move || server::serve(client_listener, state));
    (client_addr, dir)
}

fn send(stream: &mut TcpStream, message: &str) {
    send_message(stream, message).unwrap();
}

fn recv(stream: &mut TcpStream) -> String {
    recv_message(stream).unwrap().expect("connection closed unexpectedly")
}

#[test]
fn write_session_commits_and_read_observes_it() {
    let (addr, _dir) = spin_up_storage_server();

    let mut writer = TcpStream::connect(addr).unwrap();
    send(&mut writer, "WRITE a.txt 0");
    assert_eq!(recv(&mut writer), "202 ACK_WRITE: Ready for updates.");
    send(&mut writer, "0 hello world.");
    send(&mut writer, "ETIRW");
    assert_eq!(recv(&mut writer), "200 OK");
    drop(writer);

    let mut reader = TcpStream::connect(addr).unwrap();
    send(&mut reader, "READ a.txt");
    let mut content = Vec::new();
    reader.read_to_end(&mut content).unwrap();
    assert_eq!(String::from_utf8(content).unwrap(), "hello world.");
}

#[test]
fn concurrent_write_on_same_sentence_is_rejected() {
    let (addr, _dir) = spin_up_storage_server();

    let mut first = TcpStream::connect(addr).unwrap();
    send(&mut first, "WRITE a.txt 0");
    assert_eq!(recv(&mut first), "202 ACK_WRITE: Ready for updates.");

    let mut second = TcpStream::connect(addr).unwrap();
    send(&mut second, "WRITE a.txt 0");
    assert_eq!(recv(&mut second), "423 ERROR: This sentence is being edited by another user.");
}

#[test]
fn undo_reverts_the_last_committed_write() {
    let (addr, _dir) = spin_up_storage_server();

    let mut writer = TcpStream::connect(addr).unwrap();
    send(&mut writer, "WRITE a.txt 0");
    assert_eq!(recv(&mut writer), "202 ACK_WRITE: Ready for updates.");
    send(&mut writer, "0 hello world.");
    send(&mut writer, "ETIRW");
    assert_eq!(recv(&mut writer), "200 OK");
    drop(writer);

    let mut writer2 = TcpStream::connect(addr).unwrap();
    send(&mut writer2, "WRITE a.txt 1");
    assert_eq!(recv(&mut writer2), "202 ACK_WRITE: Ready for updates.");
    send(&mut writer2, "0 bye.");
    send(&mut writer2, "ETIRW");
    assert_eq!(recv(&mut writer2), "200 OK");
    drop(writer2);

    let mut undoer = TcpStream::connect(addr).unwrap();
    send(&mut undoer, "UNDO a.txt");
    assert_eq!(recv(&mut undoer), "200 OK");
    drop(undoer);

    let mut reader = TcpStream::connect(addr).unwrap();
    send(&mut reader, "READ a.txt");
    let mut content = Vec::new();
    reader.read_to_end(&mut content).unwrap();
    assert_eq!(String::from_utf8(content).unwrap(), "hello world.");
}

#[test]
fn undo_with_no_prior_write_returns_not_found() {
    let (addr, _dir) = spin_up_storage_server();
    let mut stream = TcpStream::connect(addr).unwrap();
    send(&mut stream, "UNDO never-written.txt");
    let reply = recv(&mut stream);
    assert!(reply.starts_with("404 ERROR"));
}

#[test]
fn stream_emits_each_token_as_its_own_message() {
    let (addr, _dir) = spin_up_storage_server();

    let mut writer = TcpStream::connect(addr).unwrap();
    send(&mut writer, "WRITE a.txt 0");
    assert_eq!(recv(&mut writer), "202 ACK_WRITE: Ready for updates.");
    send(&mut writer, "0 hello world.");
    send(&mut writer, "ETIRW");
    assert_eq!(recv(&mut writer), "200 OK");
    drop(writer);

    let mut streamer = TcpStream::connect(addr).unwrap();
    send(&mut streamer, "STREAM a.txt");
    assert_eq!(recv(&mut streamer), "hello");
    assert_eq!(recv(&mut streamer), "world");
    assert_eq!(recv(&mut streamer), ".");
}

#[test]
fn client_disconnect_mid_session_commits_buffered_updates() {
    let (addr, _dir) = spin_up_storage_server();

    let mut writer = TcpStream::connect(addr).unwrap();
    send(&mut writer, "WRITE a.txt 0");
    assert_eq!(recv(&mut writer), "202 ACK_WRITE: Ready for updates.");
    send(&mut writer, "0 hello world.");
    drop(writer);

    // Give the server's worker thread a moment to observe the close
    // and commit what it had buffered.
    std::thread::sleep(std::time::Duration::from_millis(200));

    let mut reader = TcpStream::connect(addr).unwrap();
    send(&mut reader, "READ a.txt");
    let mut content = Vec::new();
    reader.read_to_end(&mut content).unwrap();
    assert_eq!(String::from_utf8(content).unwrap(), "hello world.");
}
