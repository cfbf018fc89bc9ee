//! Integration tests driving the name server's real TCP listener:
//! client and storage-server handshakes, routing, access control, and
//! the `INIT_SS` reconnection/orphan scenario.

use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use scribe_nameserver::state::{NameServerState, PersistencePaths};
use scribe_protocol::wire::{recv_message, send_message};
use tempfile::tempdir;

fn spin_up_name_server() -> SocketAddr {
    let dir = tempdir().unwrap();
    let persistence = PersistencePaths { users_path: dir.path().join("users.jsonl"), files_path: dir.path().join("files.jsonl") };
    std::mem::forget(dir);
    let state = NameServerState::load(persistence).unwrap();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || scribe_nameserver::server::serve(listener, state));
    addr
}

fn connect_client(addr: SocketAddr, username: &str) -> TcpStream {
    let mut stream = TcpStream::connect(addr).unwrap();
    send_message(&mut stream, &format!("INIT_CLIENT {username}")).unwrap();
    stream
}

fn connect_storage_server(addr: SocketAddr, client_port: u16, files: &[&str]) -> TcpStream {
    let mut stream = TcpStream::connect(addr).unwrap();
    send_message(&mut stream, &format!("INIT_SS {client_port} [{}]", files.join(","))).unwrap();
    // Give the name server's worker thread a moment to register before
    // the caller issues a request that depends on this SS being live.
    thread::sleep(Duration::from_millis(50));
    stream
}

fn command(stream: &mut TcpStream, message: &str) -> String {
    send_message(stream, message).unwrap();
    recv_message(stream).unwrap().unwrap()
}

#[test]
fn create_without_live_storage_server_is_unavailable() {
    let addr = spin_up_name_server();
    let mut client = connect_client(addr, "alice");
    let reply = command(&mut client, "CREATE notes.txt");
    assert!(reply.starts_with("503"), "unexpected reply: {reply}");
}

#[test]
fn create_then_view_lists_the_new_file() {
    let addr = spin_up_name_server();
    let _ss = connect_storage_server(addr, 9101, &[]);
    let mut client = connect_client(addr, "alice");

    let created = command(&mut client, "CREATE notes.txt");
    assert!(created.starts_with("201"), "unexpected reply: {created}");

    let viewed = command(&mut client, "VIEW");
    assert!(viewed.contains("notes.txt"), "unexpected reply: {viewed}");
}

#[test]
fn create_existing_file_is_a_conflict() {
    let addr = spin_up_name_server();
    let _ss = connect_storage_server(addr, 9102, &[]);
    let mut client = connect_client(addr, "alice");
    command(&mut client, "CREATE notes.txt");

    let second = command(&mut client, "CREATE notes.txt");
    assert!(second.starts_with("409"), "unexpected reply: {second}");
}

#[test]
fn write_routes_to_the_owning_storage_server() {
    let addr = spin_up_name_server();
    let _ss = connect_storage_server(addr, 9103, &[]);
    let mut client = connect_client(addr, "alice");
    command(&mut client, "CREATE notes.txt");

    let routed = command(&mut client, "WRITE notes.txt");
    assert!(routed.starts_with("202 OK"), "unexpected reply: {routed}");
    assert!(routed.contains(":9103"), "unexpected reply: {routed}");
}

#[test]
fn non_owner_without_grant_cannot_write() {
    let addr = spin_up_name_server();
    let _ss = connect_storage_server(addr, 9104, &[]);
    let mut alice = connect_client(addr, "alice");
    command(&mut alice, "CREATE notes.txt");

    let mut bob = connect_client(addr, "bob");
    let reply = command(&mut bob, "WRITE notes.txt");
    assert!(reply.starts_with("401"), "unexpected reply: {reply}");
}

#[test]
fn addaccess_grants_read_but_not_write() {
    let addr = spin_up_name_server();
    let _ss = connect_storage_server(addr, 9105, &[]);
    let mut alice = connect_client(addr, "alice");
    command(&mut alice, "CREATE notes.txt");
    let granted = command(&mut alice, "ADDACCESS -R notes.txt bob");
    assert!(granted.starts_with("200"), "unexpected reply: {granted}");

    let mut bob = connect_client(addr, "bob");
    let read = command(&mut bob, "READ notes.txt");
    assert!(read.starts_with("202"), "unexpected reply: {read}");
    let write = command(&mut bob, "WRITE notes.txt");
    assert!(write.starts_with("401"), "unexpected reply: {write}");
}

#[test]
fn remaccess_revokes_a_previously_granted_user() {
    let addr = spin_up_name_server();
    let _ss = connect_storage_server(addr, 9106, &[]);
    let mut alice = connect_client(addr, "alice");
    command(&mut alice, "CREATE notes.txt");
    command(&mut alice, "ADDACCESS -R notes.txt bob");
    command(&mut alice, "REMACCESS notes.txt bob");

    let mut bob = connect_client(addr, "bob");
    let read = command(&mut bob, "READ notes.txt");
    assert!(read.starts_with("401"), "unexpected reply: {read}");
}

#[test]
fn non_owner_cannot_delete_or_addaccess() {
    let addr = spin_up_name_server();
    let _ss = connect_storage_server(addr, 9107, &[]);
    let mut alice = connect_client(addr, "alice");
    command(&mut alice, "CREATE notes.txt");

    let mut bob = connect_client(addr, "bob");
    assert!(command(&mut bob, "DELETE notes.txt").starts_with("401"));
    assert!(command(&mut bob, "ADDACCESS -W notes.txt bob").starts_with("401"));
}

#[test]
fn delete_removes_the_file_from_view() {
    let addr = spin_up_name_server();
    let _ss = connect_storage_server(addr, 9108, &[]);
    let mut client = connect_client(addr, "alice");
    command(&mut client, "CREATE notes.txt");

    let deleted = command(&mut client, "DELETE notes.txt");
    assert!(deleted.starts_with("200"), "unexpected reply: {deleted}");

    let viewed = command(&mut client, "VIEW");
    assert!(!viewed.contains("notes.txt"));

    let info = command(&mut client, "INFO notes.txt");
    assert!(info.starts_with("404"));
}

#[test]
fn list_reports_every_user_seen() {
    let addr = spin_up_name_server();
    let mut alice = connect_client(addr, "alice");
    let mut bob = connect_client(addr, "bob");
    // Issue one command each so both usernames are recorded before LIST.
    command(&mut alice, "VIEW");
    command(&mut bob, "VIEW");

    let listed = command(&mut alice, "LIST");
    assert!(listed.contains("alice"));
    assert!(listed.contains("bob"));
}

/// A storage server reconnects advertising a file the name server has
/// never heard of. That file becomes an orphan, invisible to
/// clients, while files it already knew about are relocated to the
/// new address.
#[test]
fn reconnecting_storage_server_relocates_known_files_and_orphans_are_invisible() {
    let addr = spin_up_name_server();
    let first = connect_storage_server(addr, 9201, &[]);
    let mut client = connect_client(addr, "alice");
    command(&mut client, "CREATE notes.txt");

    let routed_to_first = command(&mut client, "WRITE notes.txt");
    assert!(routed_to_first.contains(":9201"));

    drop(first);
    thread::sleep(Duration::from_millis(50));

    let _second = connect_storage_server(addr, 9202, &["notes.txt", "mystery.txt"]);

    let routed_to_second = command(&mut client, "WRITE notes.txt");
    assert!(routed_to_second.contains(":9202"), "unexpected reply: {routed_to_second}");

    // mystery.txt was never created through the name server; it stays
    // an orphan and never appears to a client.
    let viewed = command(&mut client, "VIEW");
    assert!(!viewed.contains("mystery.txt"));
    let info = command(&mut client, "INFO mystery.txt");
    assert!(info.starts_with("404"));
}
