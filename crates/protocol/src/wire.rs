//! Message framing: one `recv` call is one logical message.
//!
//! Messages are ASCII, space-separated, carry no trailing newline, and
//! are bounded by [`MAX_MESSAGE_SIZE`], the single constant both peers
//! must agree on for framing to stay in sync.

use std::io::{self, Read, Write};

/// Maximum size, in bytes, of a single wire message. Matches the
/// original implementation's `BUFFER_SIZE`.
pub const MAX_MESSAGE_SIZE: usize = 4096;

/// Sends one logical message over `stream`. The message must not
/// contain a trailing newline; none is added.
pub fn send_message(stream: &mut impl Write, message: &str) -> io::Result<()> {
    stream.write_all(message.as_bytes())
}

/// Reads one logical message from `stream`.
///
/// Returns `Ok(None)` if the peer closed the connection cleanly before
/// sending any bytes (end of session, not an error). A message larger
/// than [`MAX_MESSAGE_SIZE`] is truncated to that many bytes, matching
/// the original's fixed-size `recv` buffer.
pub fn recv_message(stream: &mut impl Read) -> io::Result<Option<String>> {
    let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
    let n = stream.read(&mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_single_message() {
        let mut sink = Vec::new();
        send_message(&mut sink, "VIEW").unwrap();
        let mut cursor = Cursor::new(sink);
        let message = recv_message(&mut cursor).unwrap().unwrap();
        assert_eq!(message, "VIEW");
    }

    #[test]
    fn empty_read_reports_clean_close() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(recv_message(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn sent_message_carries_no_trailing_newline() {
        let mut sink = Vec::new();
        send_message(&mut sink, "200 OK").unwrap();
        assert_eq!(sink, b"200 OK");
    }
}
