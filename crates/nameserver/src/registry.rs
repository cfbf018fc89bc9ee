//! The set of currently live storage servers, and round-robin
//! selection among them for `CREATE`.

use std::net::TcpStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use scribe_protocol::nm_ss::NmToSsCommand;
use scribe_protocol::wire::send_message;

/// One live storage server: its advertised address and the control
/// connection the name server drives it over.
pub struct LiveStorageServer {
    pub id: u64,
    pub ip: String,
    pub client_port: u16,
    writer: Mutex<TcpStream>,
}

impl LiveStorageServer {
    #[must_use]
    pub fn new(id: u64, ip: String, client_port: u16, writer: TcpStream) -> Self {
        Self { id, ip, client_port, writer: Mutex::new(writer) }
    }

    /// Address clients should connect to for file operations.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.client_port)
    }

    /// Sends an `NmToSsCommand` over this server's control channel.
    /// Fire-and-forget: no acknowledgement is defined for `CREATE`/
    /// `DELETE`, so failures are logged and dropped.
    pub fn send_command(&self, command: &NmToSsCommand) {
        let Ok(mut writer) = self.writer.lock() else {
            tracing::error!("storage server control writer lock poisoned");
            return;
        };
        if let Err(error) = send_message(&mut *writer, &command.render()) {
            tracing::warn!(%error, ss_id = self.id, "failed to deliver control command to storage server");
        }
    }
}

/// The live storage server registry: insertion order is preserved so
/// round-robin selection is deterministic and stable as servers join.
#[derive(Default)]
pub struct SsRegistry {
    servers: RwLock<Vec<std::sync::Arc<LiveStorageServer>>>,
    round_robin: AtomicUsize,
    next_id: AtomicUsize,
}

impl SsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly connected storage server and returns its id.
    pub fn register(&self, ip: String, client_port: u16, writer: TcpStream) -> std::sync::Arc<LiveStorageServer> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64;
        let server = std::sync::Arc::new(LiveStorageServer::new(id, ip, client_port, writer));
        self.servers.write().expect("ss registry lock poisoned").push(server.clone());
        server
    }

    /// Removes a storage server (its control connection died).
    pub fn remove(&self, id: u64) {
        self.servers.write().expect("ss registry lock poisoned").retain(|s| s.id != id);
    }

    /// Whether a storage server at `ip:client_port` is currently live.
    #[must_use]
    pub fn is_live(&self, ip: &str, client_port: u16) -> bool {
        self.servers
            .read()
            .expect("ss registry lock poisoned")
            .iter()
            .any(|s| s.ip == ip && s.client_port == client_port)
    }

    /// Looks up the live storage server at `ip:client_port`, if any.
    #[must_use]
    pub fn find(&self, ip: &str, client_port: u16) -> Option<std::sync::Arc<LiveStorageServer>> {
        self.servers
            .read()
            .expect("ss registry lock poisoned")
            .iter()
            .find(|s| s.ip == ip && s.client_port == client_port)
            .cloned()
    }

    /// Picks the next live storage server by round robin, for
    /// `CREATE`'s SS assignment. Returns `None` if no storage server
    /// is currently live.
    pub fn pick_round_robin(&self) -> Option<std::sync::Arc<LiveStorageServer>> {
        let servers = self.servers.read().expect("ss registry lock poisoned");
        if servers.is_empty() {
            return None;
        }
        let index = self.round_robin.fetch_add(1, Ordering::SeqCst) % servers.len();
        Some(servers[index].clone())
    }

    /// How many storage servers are currently live.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.servers.read().expect("ss registry lock poisoned").len()
    }
}
