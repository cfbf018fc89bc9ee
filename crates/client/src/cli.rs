//! A one-shot command-line front end over [`NmSession`]/[`ss`]. Not
//! an interactive prompt: each invocation issues exactly one
//! command and exits, since the interactive REPL loop that the
//! original tool wraps around this is a separate concern.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use scribe_protocol::client_nm::AccessLevel;

use crate::session::NmSession;
use crate::ss;

/// `scribe-client` command-line configuration.
#[derive(Debug, Parser)]
#[command(name = "scribe-client", version, about = "Client for the scribe distributed text-file service")]
pub struct Cli {
    /// Name server address (`host:port`).
    #[arg(long)]
    pub nm_addr: String,

    /// Username to assert for this session.
    #[arg(long)]
    pub username: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List files (`VIEW`).
    View {
        /// `a` to include files the caller cannot read, `l` for the long form.
        #[arg(default_value = "")]
        flags: String,
    },
    /// Register a new file (`CREATE`).
    Create { filename: String },
    /// Remove a file (`DELETE`).
    Delete { filename: String },
    /// Print a file's bytes (`READ`).
    Read { filename: String },
    /// Print a file's tokens, paced (`STREAM`).
    Stream { filename: String },
    /// Open a write session against one sentence, applying a batch of
    /// `<word_index>:<content>` updates non-interactively.
    Write {
        filename: String,
        sentence_index: i64,
        #[arg(long = "update", value_name = "WORD_INDEX:CONTENT")]
        updates: Vec<String>,
    },
    /// Revert the most recent committed write (`UNDO`).
    Undo { filename: String },
    /// Print a file's metadata (`INFO`).
    Info { filename: String },
    /// Grant access to another user (`ADDACCESS`).
    AddAccess {
        #[arg(value_enum)]
        level: AddAccessLevel,
        filename: String,
        target_user: String,
    },
    /// Revoke access from another user (`REMACCESS`).
    RemAccess { filename: String, target_user: String },
    /// Run a file as a script and stream its output (`EXEC`).
    Exec { filename: String },
    /// List every user the name server has ever seen (`LIST`).
    List,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum AddAccessLevel {
    R,
    W,
}

impl From<AddAccessLevel> for AccessLevel {
    fn from(level: AddAccessLevel) -> Self {
        match level {
            AddAccessLevel::R => Self::Read,
            AddAccessLevel::W => Self::Write,
        }
    }
}

/// Parses `args`, issues the requested command, prints the result,
/// and returns the process exit code.
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    match run_with_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run_with_cli(cli: Cli) -> Result<(), crate::error::ClientError> {
    let mut nm = NmSession::connect(&cli.nm_addr, &cli.username)?;

    match cli.command {
        Command::View { flags } => println!("{}", nm.view(&flags)?),
        Command::Create { filename } => println!("{}", nm.create(&filename)?),
        Command::Delete { filename } => println!("{}", nm.delete(&filename)?),
        Command::Read { filename } => {
            let address = nm.route_read(&filename)?;
            let bytes = ss::read(&address, &filename)?;
            print!("{}", String::from_utf8_lossy(&bytes));
        }
        Command::Stream { filename } => {
            let address = nm.route_stream(&filename)?;
            for token in ss::stream(&address, &filename)? {
                println!("{token}");
            }
        }
        Command::Write { filename, sentence_index, updates } => {
            let address = nm.route_write(&filename)?;
            let mut session = ss::WriteSession::open(&address, &filename, sentence_index)?;
            for update in &updates {
                let (index, content) = update
                    .split_once(':')
                    .ok_or_else(|| crate::error::ClientError::UnexpectedReply(format!("malformed update: {update}")))?;
                let index: usize = index
                    .parse()
                    .map_err(|_| crate::error::ClientError::UnexpectedReply(format!("malformed update: {update}")))?;
                session.update(index, content)?;
            }
            session.commit()?;
            println!("200 OK");
        }
        Command::Undo { filename } => {
            let address = nm.route_undo(&filename)?;
            ss::undo(&address, &filename)?;
            println!("200 OK");
        }
        Command::Info { filename } => println!("{}", nm.info(&filename)?),
        Command::AddAccess { level, filename, target_user } => {
            println!("{}", nm.add_access(level.into(), &filename, &target_user)?);
        }
        Command::RemAccess { filename, target_user } => println!("{}", nm.rem_access(&filename, &target_user)?),
        Command::Exec { filename } => {
            for line in nm.exec(&filename)? {
                println!("{line}");
            }
        }
        Command::List => println!("{}", nm.list()?),
    }
    Ok(())
}
