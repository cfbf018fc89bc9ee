//! The command set a client sends to the name server, and the name
//! server's replies to it.
//!
//! Grounded on `name_server/client_handler.c`'s dispatch table and its
//! per-command argument parsing.

use scribe_core::WireError;

/// `VIEW`'s optional flag letters. `a` lists files the caller cannot
/// read, `l` renders the tabular long form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewFlags {
    pub all: bool,
    pub long: bool,
}

impl ViewFlags {
    fn parse(token: &str) -> Self {
        Self {
            all: token.contains('a'),
            long: token.contains('l'),
        }
    }
}

/// One of `-R` or `-W`, as accepted by `ADDACCESS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Read,
    Write,
}

impl AccessLevel {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "-R" => Some(Self::Read),
            "-W" => Some(Self::Write),
            _ => None,
        }
    }
}

/// A request originating from a client, addressed to the name server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    View { flags: ViewFlags },
    Create { filename: String },
    Delete { filename: String },
    Read { filename: String },
    Write { filename: String },
    Stream { filename: String },
    Undo { filename: String },
    Info { filename: String },
    AddAccess {
        level: AccessLevel,
        filename: String,
        target_user: String,
    },
    RemAccess {
        filename: String,
        target_user: String,
    },
    Exec { filename: String },
    List,
}

impl ClientCommand {
    /// Parses one already-framed, newline-trimmed command line.
    pub fn parse(message: &str) -> Result<Self, WireError> {
        let args: Vec<&str> = message.split_whitespace().collect();
        let Some(&cmd) = args.first() else {
            return Err(WireError::bad_request("Empty command"));
        };

        match cmd {
            "VIEW" => {
                let flags = args.get(1).map_or(ViewFlags::default(), |f| ViewFlags::parse(f));
                Ok(Self::View { flags })
            }
            "CREATE" | "DELETE" | "READ" | "WRITE" | "STREAM" | "UNDO" | "INFO" | "EXEC" => {
                let filename = args
                    .get(1)
                    .ok_or_else(|| WireError::bad_request(format!("Usage: {cmd} <filename>")))?
                    .to_string();
                Ok(match cmd {
                    "CREATE" => Self::Create { filename },
                    "DELETE" => Self::Delete { filename },
                    "READ" => Self::Read { filename },
                    "WRITE" => Self::Write { filename },
                    "STREAM" => Self::Stream { filename },
                    "UNDO" => Self::Undo { filename },
                    "INFO" => Self::Info { filename },
                    "EXEC" => Self::Exec { filename },
                    _ => unreachable!(),
                })
            }
            "ADDACCESS" => {
                if args.len() != 4 {
                    return Err(WireError::bad_request(
                        "Usage: ADDACCESS -R|-W <filename> <username>",
                    ));
                }
                let level = AccessLevel::parse(args[1])
                    .ok_or_else(|| WireError::bad_request("Invalid permission flag. Use -R or -W."))?;
                Ok(Self::AddAccess {
                    level,
                    filename: args[2].to_string(),
                    target_user: args[3].to_string(),
                })
            }
            "REMACCESS" => {
                if args.len() != 3 {
                    return Err(WireError::bad_request("Usage: REMACCESS <filename> <username>"));
                }
                Ok(Self::RemAccess {
                    filename: args[1].to_string(),
                    target_user: args[2].to_string(),
                })
            }
            "LIST" => Ok(Self::List),
            other => Err(WireError::bad_request(format!("Unknown command: {other}"))),
        }
    }
}
