//! Top-level wiring: one listener for clients, one control connection
//! to the name server, both started by [`run`].

use std::net::TcpListener;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::Parser;

use crate::control::NmControlChannel;
use crate::file_store::FileStore;
use crate::locks::{FileLocks, SentenceLocks};
use crate::mod_log::ModLog;
use crate::session_handler::{self, ServerState};

/// `scribe-ss` command-line configuration.
#[derive(Debug, Parser)]
#[command(name = "scribe-ss", version, about = "Storage server for the scribe distributed text-file service")]
pub struct Cli {
    /// Name server address (`host:port`) to register with.
    #[arg(long)]
    pub nm_addr: String,

    /// Port this server listens on for client `READ`/`STREAM`/`WRITE`/`UNDO` sessions.
    #[arg(long)]
    pub client_port: u16,

    /// Directory holding this server's resident files and undo sidecars.
    #[arg(long, default_value = "./scribe-ss-data")]
    pub storage_dir: String,
}

/// Parses `args`, brings the storage server up, and blocks forever
/// servicing connections. Returns only on an unrecoverable startup
/// failure.
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    match run_with_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "storage server exited");
            ExitCode::FAILURE
        }
    }
}

fn run_with_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(cli.storage_dir.as_str())?;
    let control = NmControlChannel::connect(&cli.nm_addr, cli.client_port, store.clone())?;

    let state = ServerState {
        store,
        sentence_locks: Arc::new(SentenceLocks::new()),
        file_locks: Arc::new(FileLocks::new()),
        mod_log: Arc::new(ModLog::new()),
        control,
    };

    let listener = TcpListener::bind(("0.0.0.0", cli.client_port))?;
    tracing::info!(port = cli.client_port, "storage server listening for clients");
    serve(listener, state);
    Ok(())
}

/// Accepts client connections on `listener` forever, dispatching each
/// to its own worker thread. Split out from [`run`] so integration
/// tests can drive a real listener against a `ServerState` without
/// standing up a name server to satisfy [`NmControlChannel::connect`].
pub fn serve(listener: TcpListener, state: ServerState) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(error) => {
                tracing::warn!(%error, "failed to accept client connection");
                continue;
            }
        };
        let state = state.clone();
        thread::spawn(move || session_handler::handle_connection(stream, state));
    }
}
