//! The control channel the name server uses to drive a storage server:
//! file lifecycle commands out, acknowledgements and stat updates back.
//!
//! Grounded on `name_server/ss_handler.c`'s `nm_handle_ss_messages` and
//! `storage_server/file_ops.c`'s `INFO_UPDATE` emission.

use scribe_core::WireError;

/// A command the name server sends down to a storage server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NmToSsCommand {
    Create { filename: String },
    Delete { filename: String },
    GetContent { filename: String },
}

impl NmToSsCommand {
    /// Parses an already-framed command as received on a storage
    /// server's control channel.
    pub fn parse(message: &str) -> Result<Self, WireError> {
        let mut parts = message.split_whitespace();
        let (cmd, filename) = match (parts.next(), parts.next(), parts.next()) {
            (Some(cmd), Some(filename), None) => (cmd, filename.to_string()),
            _ => return Err(WireError::bad_request("Invalid NM control command")),
        };
        match cmd {
            "CREATE" => Ok(Self::Create { filename }),
            "DELETE" => Ok(Self::Delete { filename }),
            "GET_CONTENT" => Ok(Self::GetContent { filename }),
            other => Err(WireError::bad_request(format!("Unknown NM control command: {other}"))),
        }
    }

    /// Renders the wire form of this command.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Create { filename } => format!("CREATE {filename}"),
            Self::Delete { filename } => format!("DELETE {filename}"),
            Self::GetContent { filename } => format!("GET_CONTENT {filename}"),
        }
    }
}

/// A message a storage server sends up to the name server, unprompted
/// by a specific request (an acknowledgement or a stat refresh).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsToNmMessage {
    InfoUpdate {
        filename: String,
        size: u64,
        words: u64,
        chars: u64,
    },
}

impl SsToNmMessage {
    /// Parses an already-framed message from a storage server's
    /// ack/update channel.
    pub fn parse(message: &str) -> Result<Self, WireError> {
        let parts: Vec<&str> = message.split_whitespace().collect();
        if parts.len() == 5 && parts[0] == "INFO_UPDATE" {
            let size = parts[2]
                .parse()
                .map_err(|_| WireError::bad_request("Invalid INFO_UPDATE size"))?;
            let words = parts[3]
                .parse()
                .map_err(|_| WireError::bad_request("Invalid INFO_UPDATE word count"))?;
            let chars = parts[4]
                .parse()
                .map_err(|_| WireError::bad_request("Invalid INFO_UPDATE char count"))?;
            return Ok(Self::InfoUpdate {
                filename: parts[1].to_string(),
                size,
                words,
                chars,
            });
        }
        Err(WireError::bad_request("Unrecognized SS message"))
    }

    /// Renders the wire form of this message.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::InfoUpdate { filename, size, words, chars } => {
                format!("INFO_UPDATE {filename} {size} {words} {chars}")
            }
        }
    }
}
