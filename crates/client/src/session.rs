//! A client's connection to the name server: one `INIT_CLIENT`
//! handshake followed by any number of commands.

use std::net::TcpStream;

use scribe_protocol::client_nm::AccessLevel;
use scribe_protocol::handshake::InitClient;
use scribe_protocol::wire::{recv_message, send_message};

use crate::error::ClientError;

/// An open session with the name server.
pub struct NmSession {
    stream: TcpStream,
}

impl NmSession {
    /// Connects to `addr` and sends the `INIT_CLIENT` handshake for
    /// `username`.
    pub fn connect(addr: &str, username: &str) -> Result<Self, ClientError> {
        let mut stream = TcpStream::connect(addr)?;
        send_message(&mut stream, &InitClient { username: username.to_string() }.render())?;
        Ok(Self { stream })
    }

    /// Sends one already-formatted command line and returns its
    /// reply, turning a non-`2xx` status into an error.
    fn request(&mut self, message: &str) -> Result<String, ClientError> {
        send_message(&mut self.stream, message)?;
        let reply = recv_message(&mut self.stream)?.ok_or(ClientError::ConnectionClosed)?;
        ClientError::from_reply(reply)
    }

    /// `VIEW [flags]`.
    pub fn view(&mut self, flags: &str) -> Result<String, ClientError> {
        if flags.is_empty() {
            self.request("VIEW")
        } else {
            self.request(&format!("VIEW {flags}"))
        }
    }

    /// `CREATE <f>`.
    pub fn create(&mut self, filename: &str) -> Result<String, ClientError> {
        self.request(&format!("CREATE {filename}"))
    }

    /// `DELETE <f>`.
    pub fn delete(&mut self, filename: &str) -> Result<String, ClientError> {
        self.request(&format!("DELETE {filename}"))
    }

    /// Routes a file-bytes operation (`READ`/`STREAM`/`WRITE`/`UNDO`)
    /// and parses the `202 OK <ip>:<port>` reply into the storage
    /// server's address.
    fn route(&mut self, verb: &str, filename: &str) -> Result<String, ClientError> {
        let reply = self.request(&format!("{verb} {filename}"))?;
        reply
            .rsplit(' ')
            .next()
            .filter(|candidate| candidate.contains(':'))
            .map(str::to_string)
            .ok_or(ClientError::UnexpectedReply(reply))
    }

    /// Routes `READ <f>`, returning the owning storage server's address.
    pub fn route_read(&mut self, filename: &str) -> Result<String, ClientError> {
        self.route("READ", filename)
    }

    /// Routes `STREAM <f>`, returning the owning storage server's address.
    pub fn route_stream(&mut self, filename: &str) -> Result<String, ClientError> {
        self.route("STREAM", filename)
    }

    /// Routes `WRITE <f>`, returning the owning storage server's address.
    pub fn route_write(&mut self, filename: &str) -> Result<String, ClientError> {
        self.route("WRITE", filename)
    }

    /// Routes `UNDO <f>`, returning the owning storage server's address.
    pub fn route_undo(&mut self, filename: &str) -> Result<String, ClientError> {
        self.route("UNDO", filename)
    }

    /// `INFO <f>`.
    pub fn info(&mut self, filename: &str) -> Result<String, ClientError> {
        self.request(&format!("INFO {filename}"))
    }

    /// `ADDACCESS -R|-W <f> <u>`.
    pub fn add_access(&mut self, level: AccessLevel, filename: &str, target_user: &str) -> Result<String, ClientError> {
        let flag = match level {
            AccessLevel::Read => "-R",
            AccessLevel::Write => "-W",
        };
        self.request(&format!("ADDACCESS {flag} {filename} {target_user}"))
    }

    /// `REMACCESS <f> <u>`.
    pub fn rem_access(&mut self, filename: &str, target_user: &str) -> Result<String, ClientError> {
        self.request(&format!("REMACCESS {filename} {target_user}"))
    }

    /// `LIST`.
    pub fn list(&mut self) -> Result<String, ClientError> {
        self.request("LIST")
    }

    /// `EXEC <f>`: sends the command, then reads the streamed
    /// stdout/stderr lines up to and including the terminal
    /// `201 OK: Execution finished.` line.
    pub fn exec(&mut self, filename: &str) -> Result<Vec<String>, ClientError> {
        send_message(&mut self.stream, &format!("EXEC {filename}"))?;
        let mut lines = Vec::new();
        loop {
            let line = recv_message(&mut self.stream)?.ok_or(ClientError::ConnectionClosed)?;
            let is_terminal = line.starts_with("201 OK");
            let is_error = line.starts_with("4") || line.starts_with("5");
            if is_error {
                return Err(ClientError::Server(line));
            }
            if is_terminal {
                return Ok(lines);
            }
            lines.push(line);
        }
    }
}
