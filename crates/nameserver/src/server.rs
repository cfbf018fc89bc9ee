//! Top-level wiring: one accept loop, dispatching each connection to
//! its own worker thread.

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::Parser;

use crate::dispatch;
use crate::state::{NameServerState, PersistencePaths};

/// `scribe-nm` command-line configuration.
#[derive(Debug, Parser)]
#[command(name = "scribe-nm", version, about = "Name server for the scribe distributed text-file service")]
pub struct Cli {
    /// Port this server listens on for client and storage-server connections.
    #[arg(long, default_value_t = 9000)]
    pub port: u16,

    /// Directory holding the persisted users and files stores.
    #[arg(long, default_value = "./scribe-nm-data")]
    pub state_dir: String,
}

/// Parses `args`, brings the name server up, and blocks forever
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
            tracing::error!(%error, "name server exited");
            ExitCode::FAILURE
        }
    }
}

fn run_with_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let state_dir = PathBuf::from(&cli.state_dir);
    std::fs::create_dir_all(&state_dir)?;
    let persistence = PersistencePaths { users_path: state_dir.join("users.jsonl"), files_path: state_dir.join("files.jsonl") };
    let state = NameServerState::load(persistence)?;

    let listener = TcpListener::bind(("0.0.0.0", cli.port))?;
    tracing::info!(port = cli.port, "name server listening");
    serve(listener, state);
    Ok(())
}

/// Accepts connections on `listener` forever, dispatching each to its
/// own worker thread. Split out from [`run`] so integration tests can
/// drive a real listener against a freshly constructed
/// [`NameServerState`].
pub fn serve(listener: TcpListener, state: Arc<NameServerState>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(error) => {
                tracing::warn!(%error, "failed to accept connection");
                continue;
            }
        };
        let state = state.clone();
        thread::spawn(move || dispatch::handle_connection(stream, state));
    }
}
