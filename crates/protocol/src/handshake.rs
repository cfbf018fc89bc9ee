//! The first message a new connection sends before anything else is
//! dispatched.
//!
//! Grounded on `name_server.c`'s dispatch between `INIT_CLIENT` and
//! `INIT_SS`, and `ss_handler.c`'s parsing of the latter.

use scribe_core::WireError;

/// A client's opening handshake: `INIT_CLIENT <username>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitClient {
    pub username: String,
}

/// A storage server's opening handshake:
/// `INIT_SS <client_port> [file1,file2,file3]`.
///
/// The bracketed list is comma-separated and may be empty (`[]`) for a
/// storage server with no resident files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitSs {
    pub client_port: u16,
    pub files: Vec<String>,
}

impl InitClient {
    /// Parses an already-framed `INIT_CLIENT` message.
    pub fn parse(message: &str) -> Result<Self, WireError> {
        let mut parts = message.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("INIT_CLIENT"), Some(username), None) => Ok(Self {
                username: username.to_string(),
            }),
            _ => Err(WireError::bad_request("Invalid INIT_CLIENT")),
        }
    }

    /// Renders the wire form of this handshake.
    #[must_use]
    pub fn render(&self) -> String {
        format!("INIT_CLIENT {}", self.username)
    }
}

impl InitSs {
    /// Parses an already-framed `INIT_SS` message.
    pub fn parse(message: &str) -> Result<Self, WireError> {
        let mut parts = message.split_whitespace();
        let (tag, port, file_list) = match (parts.next(), parts.next(), parts.next()) {
            (Some(tag), Some(port), Some(file_list)) => (tag, port, file_list),
            _ => return Err(WireError::bad_request("Invalid INIT_SS")),
        };
        if tag != "INIT_SS" {
            return Err(WireError::bad_request("Invalid INIT_SS"));
        }
        let client_port: u16 = port
            .parse()
            .map_err(|_| WireError::bad_request("Invalid INIT_SS client port"))?;
        let inner = file_list
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| WireError::bad_request("Invalid INIT_SS file list"))?;
        let files = if inner.is_empty() {
            Vec::new()
        } else {
            inner.split(',').map(str::to_string).collect()
        };
        Ok(Self { client_port, files })
    }

    /// Renders the wire form of this handshake.
    #[must_use]
    pub fn render(&self) -> String {
        format!("INIT_SS {} [{}]", self.client_port, self.files.join(","))
    }
}
