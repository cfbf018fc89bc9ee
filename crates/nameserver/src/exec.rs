//! `EXEC`: fetch a file's bytes from its storage server, run them as a
//! script, and stream the merged output back to the client.

use std::io::{BufRead, BufReader, Read, Write as _};
use std::net::TcpStream;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use scribe_core::WireError;
use scribe_protocol::client_ss::ClientSsCommand;
use scribe_protocol::wire::send_message;

use crate::registry::LiveStorageServer;

/// Fetches `filename` from `server`, spawns it as an executable
/// script, and streams its stdout and stderr to `client` line by
/// line, terminated by `201 OK: Execution finished.`.
pub fn run(client: &mut TcpStream, server: &LiveStorageServer, filename: &str) -> Result<(), WireError> {
    let content = fetch_content(server, filename)?;

    let mut script = tempfile::Builder::new()
        .prefix("scribe-exec-")
        .tempfile()
        .map_err(|error| WireError::internal(format!("failed to create script file: {error}")))?;
    script
        .write_all(&content)
        .map_err(|error| WireError::internal(format!("failed to write script file: {error}")))?;
    make_executable(script.path()).map_err(|error| WireError::internal(format!("failed to mark script executable: {error}")))?;

    let mut child = Command::new(script.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|error| WireError::internal(format!("failed to spawn script: {error}")))?;

    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    // stdout and stderr are read on separate threads but funneled
    // through one channel so only one thread ever writes to `client`
    // at a time. A TCP stream has no message boundaries, so two
    // threads writing concurrently could interleave and corrupt
    // framing.
    let (tx, rx) = mpsc::channel();
    let stdout_tx = tx.clone();
    let stdout_thread = thread::spawn(move || collect_lines(stdout, &stdout_tx));
    let stderr_thread = thread::spawn(move || collect_lines(stderr, &tx));

    for line in rx {
        if send_message(client, &line).is_err() {
            break;
        }
    }

    let _ = stdout_thread.join();
    let _ = stderr_thread.join();
    let _ = child.wait();

    send_message(client, "201 OK: Execution finished.").map_err(|error| WireError::internal(error.to_string()))
}

fn collect_lines(reader: impl Read, sink: &mpsc::Sender<String>) {
    for line in BufReader::new(reader).lines() {
        let Ok(line) = line else { break };
        if sink.send(line).is_err() {
            break;
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o700);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &std::path::Path) -> std::io::Result<()> {
    Ok(())
}

/// Reads `filename`'s raw bytes over a fresh connection to `server`,
/// mirroring `READ`'s framing: `GET_CONTENT` reads exactly the way
/// `READ` does.
fn fetch_content(server: &LiveStorageServer, filename: &str) -> Result<Vec<u8>, WireError> {
    let mut stream = TcpStream::connect(server.address()).map_err(|error| WireError::unavailable(error.to_string()))?;
    send_message(&mut stream, &ClientSsCommand::GetContent { filename: filename.to_string() }.render())
        .map_err(|error| WireError::internal(error.to_string()))?;

    let mut content = Vec::new();
    stream.read_to_end(&mut content).map_err(|error| WireError::internal(error.to_string()))?;
    Ok(content)
}
