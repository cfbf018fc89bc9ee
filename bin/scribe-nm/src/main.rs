#![deny(unsafe_code)]

use std::{env, process::ExitCode};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    scribe_nameserver::run(env::args_os())
}
