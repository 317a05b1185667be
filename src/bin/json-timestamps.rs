#![deny(unsafe_code)]

use mimalloc::MiMalloc;

/// High-performance memory allocator for improved allocation throughput.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[path = "cli.rs"]
mod cli;

use std::{env, io, process::ExitCode};

use timestamp::TimestampLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn main() -> ExitCode {
    init_tracing();

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    cli::run_with(env::args_os(), stdin, &mut stdout, &mut stderr)
}

/// Diagnostics go to stderr under `RUST_LOG`; spans and events also reach the
/// timing recorder, which stays silent unless `--timestamps` was passed.
fn init_tracing() {
    let diagnostics = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::from_default_env());

    let _ = tracing_subscriber::registry()
        .with(diagnostics)
        .with(TimestampLayer::new(timestamp::global()))
        .try_init();
}
