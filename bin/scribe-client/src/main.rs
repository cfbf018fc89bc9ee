#![deny(unsafe_code)]

use std::{env, process::ExitCode};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    scribe_client::run(env::args_os())
}
