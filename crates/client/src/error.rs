//! Failures a client session can report to its caller.

use thiserror::Error;

/// A failure encountered while talking to the name server or a
/// storage server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error("the peer closed the connection before replying")]
    ConnectionClosed,
    #[error("{0}")]
    Server(String),
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
}

impl ClientError {
    /// Turns a raw wire reply into an error unless it is a success
    /// code (`2xx`), in which case it is returned unchanged.
    pub fn from_reply(reply: String) -> Result<String, Self> {
        let code = reply.split_whitespace().next().and_then(|token| token.parse::<u16>().ok());
        match code {
            Some(200..=299) => Ok(reply),
            Some(_) => Err(Self::Server(reply)),
            None => Err(Self::UnexpectedReply(reply)),
        }
    }
}
