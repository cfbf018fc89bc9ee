//! The command set a client sends directly to a storage server once the
//! name server has routed it there, and the framing of a `WRITE`
//! session's buffered update stream.
//!
//! Grounded on `storage_server/file_ops.c`'s `ss_handle_client_connection`
//! and `handle_ss_write`.

use scribe_core::WireError;

/// The sentinel line that ends a `WRITE` session's update stream.
/// Spelled backwards deliberately: it is a value no real word-update
/// line can collide with, since it is not itself a valid `"<index> <content>"` pair.
pub const WRITE_SESSION_END: &str = "ETIRW";

/// A request a client sends directly to a storage server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSsCommand {
    Read { filename: String },
    Stream { filename: String },
    Write { filename: String, sentence_index: i64 },
    Undo { filename: String },
    GetContent { filename: String },
}

impl ClientSsCommand {
    /// Parses an already-framed message as sent by a client (or, for
    /// `GET_CONTENT`, by the name server acting as a fetcher for `EXEC`).
    pub fn parse(message: &str) -> Result<Self, WireError> {
        let parts: Vec<&str> = message.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(WireError::bad_request("Invalid command."));
        }
        let filename = parts[1].to_string();
        match parts[0] {
            "READ" => Ok(Self::Read { filename }),
            "STREAM" => Ok(Self::Stream { filename }),
            "GET_CONTENT" => Ok(Self::GetContent { filename }),
            "UNDO" => Ok(Self::Undo { filename }),
            "WRITE" => {
                let sentence_index = parts
                    .get(2)
                    .ok_or_else(|| WireError::bad_request("Usage: WRITE <file> <sent_num>"))?
                    .parse()
                    .map_err(|_| WireError::bad_request("Usage: WRITE <file> <sent_num>"))?;
                Ok(Self::Write { filename, sentence_index })
            }
            other => Err(WireError::bad_request(format!("Unknown command for SS: {other}"))),
        }
    }

    /// Renders the wire form of this command.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Read { filename } => format!("READ {filename}"),
            Self::Stream { filename } => format!("STREAM {filename}"),
            Self::GetContent { filename } => format!("GET_CONTENT {filename}"),
            Self::Undo { filename } => format!("UNDO {filename}"),
            Self::Write { filename, sentence_index } => format!("WRITE {filename} {sentence_index}"),
        }
    }
}

/// One message within an open `WRITE` session's buffered update stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteSessionMessage {
    /// `<word_index> <content>`: replace the word at `word_index`
    /// (within the session's target sentence) with `content`.
    Update { word_index: usize, content: String },
    /// [`WRITE_SESSION_END`]: commit the buffered updates.
    End,
}

impl WriteSessionMessage {
    /// Parses one line of an open `WRITE` session's update stream.
    pub fn parse(message: &str) -> Result<Self, WireError> {
        if message == WRITE_SESSION_END {
            return Ok(Self::End);
        }
        let (index_str, content) = message
            .split_once(' ')
            .ok_or_else(|| WireError::bad_request("Invalid update line"))?;
        let word_index = index_str
            .parse()
            .map_err(|_| WireError::bad_request("Invalid update word index"))?;
        Ok(Self::Update {
            word_index,
            content: content.to_string(),
        })
    }

    /// Renders the wire form of this message.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::End => WRITE_SESSION_END.to_string(),
            Self::Update { word_index, content } => format!("{word_index} {content}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read() {
        assert_eq!(
            ClientSsCommand::parse("READ notes.txt").unwrap(),
            ClientSsCommand::Read { filename: "notes.txt".into() }
        );
    }

    #[test]
    fn parses_write_with_sentence_index() {
        assert_eq!(
            ClientSsCommand::parse("WRITE notes.txt 3").unwrap(),
            ClientSsCommand::Write { filename: "notes.txt".into(), sentence_index: 3 }
        );
    }

    #[test]
    fn rejects_write_without_sentence_index() {
        assert!(ClientSsCommand::parse("WRITE notes.txt").is_err());
    }

    #[test]
    fn rejects_unknown_ss_command() {
        assert!(ClientSsCommand::parse("FROB notes.txt").is_err());
    }

    #[test]
    fn parses_update_line() {
        assert_eq!(
            WriteSessionMessage::parse("2 hello").unwrap(),
            WriteSessionMessage::Update { word_index: 2, content: "hello".into() }
        );
    }

    #[test]
    fn parses_end_sentinel() {
        assert_eq!(WriteSessionMessage::parse("ETIRW").unwrap(), WriteSessionMessage::End);
    }

    #[test]
    fn update_content_may_contain_spaces() {
        let msg = WriteSessionMessage::parse("0 hello world").unwrap();
        assert_eq!(msg, WriteSessionMessage::Update { word_index: 0, content: "hello world".into() });
    }
}
