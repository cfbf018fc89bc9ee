//! A client's direct connection to a storage server, once the name
//! server has routed it there.

use std::io::Read as _;
use std::net::TcpStream;

use scribe_protocol::client_ss::{ClientSsCommand, WriteSessionMessage};
use scribe_protocol::wire::{recv_message, send_message};

use crate::error::ClientError;

/// Reads `filename`'s raw bytes from the storage server at `address`.
pub fn read(address: &str, filename: &str) -> Result<Vec<u8>, ClientError> {
    let mut stream = TcpStream::connect(address)?;
    send_message(&mut stream, &ClientSsCommand::Read { filename: filename.to_string() }.render())?;
    let mut content = Vec::new();
    stream.read_to_end(&mut content)?;
    Ok(content)
}

/// Streams `filename`'s tokens from the storage server at `address`,
/// one per message, each arriving roughly 100 ms apart.
pub fn stream(address: &str, filename: &str) -> Result<Vec<String>, ClientError> {
    let mut conn = TcpStream::connect(address)?;
    send_message(&mut conn, &ClientSsCommand::Stream { filename: filename.to_string() }.render())?;
    let mut tokens = Vec::new();
    while let Some(token) = recv_message(&mut conn)? {
        tokens.push(token);
    }
    Ok(tokens)
}

/// Undoes the most recent committed write to `filename` on the
/// storage server at `address`.
pub fn undo(address: &str, filename: &str) -> Result<(), ClientError> {
    let mut stream = TcpStream::connect(address)?;
    send_message(&mut stream, &ClientSsCommand::Undo { filename: filename.to_string() }.render())?;
    let reply = recv_message(&mut stream)?.ok_or(ClientError::ConnectionClosed)?;
    ClientError::from_reply(reply)?;
    Ok(())
}

/// An open `WRITE` session against one storage server, spanning the
/// sentence lock acquired in phase 1 through the buffered-update
/// stream of phase 2.
pub struct WriteSession {
    stream: TcpStream,
}

impl WriteSession {
    /// Opens a `WRITE` session for `filename` at `sentence_index`.
    /// Fails with a server error (e.g. `423` if the sentence is
    /// already locked) instead of returning a session.
    pub fn open(address: &str, filename: &str, sentence_index: i64) -> Result<Self, ClientError> {
        let mut stream = TcpStream::connect(address)?;
        send_message(&mut stream, &ClientSsCommand::Write { filename: filename.to_string(), sentence_index }.render())?;
        let reply = recv_message(&mut stream)?.ok_or(ClientError::ConnectionClosed)?;
        ClientError::from_reply(reply)?;
        Ok(Self { stream })
    }

    /// Buffers a `<word_index> <content>` update. Not acknowledged
    /// individually; see [`WriteSession::commit`].
    pub fn update(&mut self, word_index: usize, content: &str) -> Result<(), ClientError> {
        send_message(&mut self.stream, &WriteSessionMessage::Update { word_index, content: content.to_string() }.render())?;
        Ok(())
    }

    /// Sends the `ETIRW` sentinel and waits for the commit's result.
    pub fn commit(mut self) -> Result<(), ClientError> {
        send_message(&mut self.stream, &WriteSessionMessage::End.render())?;
        let reply = recv_message(&mut self.stream)?.ok_or(ClientError::ConnectionClosed)?;
        ClientError::from_reply(reply)?;
        Ok(())
    }
}
